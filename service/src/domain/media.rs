//! Media definitions: images stored in an object storage.

use bytes::Bytes;
#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use uuid::Uuid;

define_kind! {
    #[doc = "Object storage bucket holding media files."]
    enum Bucket {
        #[doc = "Bucket of [`Product`] images.\n\n\
                 [`Product`]: crate::domain::Product"]
        Products = 1,

        #[doc = "Bucket of [`Project`] images.\n\n\
                 [`Project`]: crate::domain::Project"]
        Projects = 2,
    }
}

/// Image stored in an object storage.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Image {
    /// Public [`Url`] this [`Image`] is served from.
    pub url: Url,

    /// Storage [`Path`] of this [`Image`] inside its [`Bucket`].
    pub path: Path,
}

/// Key of a file inside a [`Bucket`].
#[derive(
    AsRef, Clone, Debug, Display, Eq, From, Hash, Into, Ord, PartialEq, PartialOrd,
)]
#[as_ref(str)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Path(String);

impl Path {
    /// Generates a new unique [`Path`] for the provided [`FileName`], placed
    /// under the provided `folder` (if any).
    #[must_use]
    pub fn generate(folder: Option<&str>, file_name: &FileName) -> Self {
        let unique = Uuid::new_v4().simple();
        Self(match folder {
            Some(folder) => format!("{folder}/{unique}-{file_name}"),
            None => format!("{unique}-{file_name}"),
        })
    }

    /// Returns the folder of this [`Path`], if it has one.
    #[must_use]
    pub fn folder(&self) -> Option<&str> {
        self.0.rsplit_once('/').map(|(folder, _)| folder)
    }
}

/// Public URL of a stored file.
#[derive(AsRef, Clone, Debug, Display, Eq, From, Hash, Into, PartialEq)]
#[as_ref(str)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Url(String);

/// Sanitized name of an uploaded file.
///
/// Contains only ASCII alphanumerics, `.`, `-` and `_`, so it's safe to be
/// used as a part of a storage [`Path`] and a [`Url`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str)]
pub struct FileName(String);

impl FileName {
    /// Maximum length of a [`FileName`] in characters.
    const MAX_LEN: usize = 100;

    /// Sanitizes the provided client-side file name into a [`FileName`].
    #[must_use]
    pub fn sanitize(original: &str) -> Self {
        // Browsers may send full client paths.
        let base = original
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
            .trim();

        let mut name = base
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect::<String>();
        if name.len() > Self::MAX_LEN {
            name = name.split_off(name.len() - Self::MAX_LEN);
        }
        let name = name.trim_start_matches('.').to_owned();

        if name.is_empty() {
            Self("image".to_owned())
        } else {
            Self(name)
        }
    }
}

/// MIME type of an uploaded image.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str)]
pub struct ContentType(String);

impl ContentType {
    /// Creates a new [`ContentType`] if the provided MIME type describes an
    /// image.
    #[must_use]
    pub fn image(mime: impl Into<String>) -> Option<Self> {
        let mime = mime.into().trim().to_ascii_lowercase();
        (mime.starts_with("image/") && mime.len() > "image/".len())
            .then_some(Self(mime))
    }
}

/// Image file received from a client and not stored yet.
#[derive(Clone, Debug)]
pub struct File {
    /// Sanitized [`FileName`] of this [`File`].
    pub name: FileName,

    /// [`ContentType`] of this [`File`].
    pub content_type: ContentType,

    /// Raw content of this [`File`].
    pub bytes: Bytes,
}

/// Request to store a [`File`] in a [`Bucket`].
#[derive(Clone, Debug)]
pub struct Upload {
    /// [`Bucket`] to store the [`File`] in.
    pub bucket: Bucket,

    /// [`Path`] to store the [`File`] at.
    pub path: Path,

    /// [`File`] to store.
    pub file: File,
}

/// Batch of stored files to be removed from a [`Bucket`] at once.
#[derive(Clone, Debug)]
pub struct Removal {
    /// [`Bucket`] the files are stored in.
    pub bucket: Bucket,

    /// [`Path`]s of the files to remove.
    pub paths: Vec<Path>,
}

/// File stored in a [`Bucket`], as reported by a storage listing.
#[derive(Clone, Debug)]
pub struct Object {
    /// [`Path`] of this [`Object`].
    pub path: Path,

    /// [`DateTime`] when this [`Object`] was stored, if known.
    pub created_at: Option<CreationDateTime>,
}

/// [`DateTime`] when an [`Object`] was stored.
pub type CreationDateTime = DateTimeOf<(Object, unit::Creation)>;
