//! [`Project`] definitions.


#[cfg(doc)]
use common::DateTime;
use common::{unit, Date, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::media;

/// Completed scaffolding project shown in the storefront portfolio.
#[derive(Clone, Debug)]
pub struct Project {
    /// ID of this [`Project`].
    pub id: Id,

    /// [`Title`] of this [`Project`].
    pub title: Title,

    /// [`Description`] of this [`Project`].
    pub description: Description,

    /// [`Location`] of this [`Project`].
    pub location: Location,

    /// [`Date`] when this [`Project`] was completed.
    pub completed_date: Date,

    /// [`Client`] this [`Project`] was made for, if disclosed.
    pub client: Option<Client>,

    /// [`Category`] of this [`Project`], if any.
    pub category: Option<Category>,

    /// Human-readable [`Duration`] of this [`Project`], if any.
    pub duration: Option<Duration>,

    /// [`Image`]s of this [`Project`] in the order they were uploaded.
    pub images: Vec<Image>,

    /// [`DateTime`] when this [`Project`] was created.
    pub created_at: CreationDateTime,
}

impl Project {
    /// Maximum number of [`Image`]s a [`Project`] may have.
    pub const MAX_IMAGES: usize = 10;
}

/// Image of a [`Project`].
#[derive(Clone, Debug)]
pub struct Image {
    /// ID of this [`Image`].
    pub id: ImageId,

    /// ID of the [`Project`] owning this [`Image`].
    pub project_id: Id,

    /// Stored [`media::Image`] itself.
    pub media: media::Image,

    /// [`DateTime`] when this [`Image`] was created.
    pub created_at: ImageCreationDateTime,
}

/// ID of a [`Project`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// ID of a [`Project`] [`Image`].
#[derive(
    Clone, Copy, Debug, Default, Display, Eq, From, FromStr, Hash, Into, PartialEq,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct ImageId(Uuid);

impl ImageId {
    /// Creates a new random [`ImageId`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Defines a trimmed non-empty text newtype limited to `$max` characters.
macro_rules! define_text {
    ($(#[$meta:meta])* $name:ident, $max:literal) => {
        $(#[$meta])*
        #[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
        #[as_ref(str, String)]
        #[cfg_attr(
            feature = "postgres",
            derive(FromSql, ToSql),
            postgres(transparent)
        )]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Creates a new [`", stringify!($name), "`] if \
                             the provided `text` is valid.")]
            ///
            /// Surrounding whitespace is trimmed.
            #[must_use]
            pub fn new(text: impl AsRef<str>) -> Option<Self> {
                let text = text.as_ref().trim();
                (!text.is_empty() && text.chars().count() <= $max)
                    .then(|| Self(text.to_owned()))
            }
        }

        impl FromStr for $name {
            type Err = &'static str;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s).ok_or(concat!("invalid `", stringify!($name), "`"))
            }
        }
    };
}

define_text!(
    /// Title of a [`Project`].
    Title, 256
);

define_text!(
    /// Description of a [`Project`].
    Description, 10_000
);

define_text!(
    /// Location of a [`Project`] (city, site address).
    Location, 256
);

define_text!(
    /// Client of a [`Project`].
    Client, 256
);

define_text!(
    /// Category of a [`Project`] (facade, industrial, etc.).
    Category, 128
);

define_text!(
    /// Free-form duration of a [`Project`] (`3 weeks`, for example).
    Duration, 128
);

/// [`DateTime`] when a [`Project`] was created.
pub type CreationDateTime = DateTimeOf<(Project, unit::Creation)>;

/// [`DateTime`] when a [`Project`] [`Image`] was created.
pub type ImageCreationDateTime = DateTimeOf<(Image, unit::Creation)>;

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use super::{Client, Title};

    #[test]
    fn trims_texts() {
        assert_eq!(Title::new("  Facade  ").unwrap().to_string(), "Facade");
        assert!(Title::new("   ").is_none());
        assert!(Title::new("a".repeat(257)).is_none());
        assert!(Client::from_str("").is_err());
    }
}
