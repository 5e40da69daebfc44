//! Multipart [`Form`] parsing.

use std::{collections::HashMap, str::FromStr};

use axum::extract::{multipart::MultipartError, Multipart};
use service::domain::media;

use crate::{define_error, AsError, Error};

/// Submitted multipart form with its text fields and image files.
#[derive(Debug, Default)]
pub struct Form {
    /// Text fields by their names.
    fields: HashMap<String, String>,

    /// Image files along with the names of the fields they were sent in.
    files: Vec<(String, media::File)>,
}

impl Form {
    /// Reads the whole [`Form`] out of the provided [`Multipart`] body.
    ///
    /// Parts carrying a file name are treated as image files, all the others
    /// as text fields. Empty file parts (sent by browsers for an empty file
    /// input) are skipped.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_IMAGE` - file is not an image;
    /// - `IMAGE_TOO_LARGE` - file exceeds `max_file_size` bytes;
    /// - `BAD_REQUEST` - body is not a valid multipart form.
    pub async fn read(
        mut multipart: Multipart,
        max_file_size: usize,
    ) -> Result<Self, Error> {
        let mut form = Self::default();

        while let Some(field) =
            multipart.next_field().await.map_err(AsError::into_error)?
        {
            let name = field.name().unwrap_or_default().to_owned();

            let Some(file_name) = field.file_name().map(media::FileName::sanitize)
            else {
                let text = field.text().await.map_err(AsError::into_error)?;
                drop(form.fields.insert(name, text));
                continue;
            };

            let content_type = field.content_type().map(ToOwned::to_owned);
            let bytes = field.bytes().await.map_err(AsError::into_error)?;
            if bytes.is_empty() {
                continue;
            }
            if bytes.len() > max_file_size {
                return Err(Error::from(MediaError::TooLarge).with_message(
                    format!(
                        "`{name}` file exceeds {max_file_size} bytes limit",
                    ),
                ));
            }
            let content_type = content_type
                .and_then(media::ContentType::image)
                .ok_or_else(|| {
                    Error::from(MediaError::NotImage).with_message(format!(
                        "`{name}` file must be an image",
                    ))
                })?;

            form.files.push((
                name,
                media::File {
                    name: file_name,
                    content_type,
                    bytes,
                },
            ));
        }

        Ok(form)
    }

    /// Parses the required text field with the provided `name`.
    ///
    /// # Errors
    ///
    /// With `MISSING_FIELD` code if the field is absent or blank, or with the
    /// provided `invalid` [`Error`] if it cannot be parsed.
    pub fn required<T: FromStr>(
        &self,
        name: &str,
        invalid: impl Into<Error>,
    ) -> Result<T, Error> {
        self.optional(name, invalid)?.ok_or_else(|| {
            Error::from(ValidationError::MissingField)
                .with_message(format!("`{name}` field is required"))
        })
    }

    /// Parses the optional text field with the provided `name`.
    ///
    /// Blank fields are treated as absent ones.
    ///
    /// # Errors
    ///
    /// With the provided `invalid` [`Error`] if the field cannot be parsed.
    pub fn optional<T: FromStr>(
        &self,
        name: &str,
        invalid: impl Into<Error>,
    ) -> Result<Option<T>, Error> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(|v| {
                v.parse().map_err(|_| {
                    let e = invalid.into();
                    let msg = format!("`{name}` field: {}", e.message);
                    e.with_message(msg)
                })
            })
            .transpose()
    }

    /// Takes all the files sent in the field with the provided `name`, in the
    /// order they were sent.
    pub fn take_files(&mut self, name: &str) -> Vec<media::File> {
        let (taken, rest) = std::mem::take(&mut self.files)
            .into_iter()
            .partition::<Vec<_>, _>(|(n, _)| n == name);
        self.files = rest;
        taken.into_iter().map(|(_, f)| f).collect()
    }

    /// Takes the single file sent in the field with the provided `name`, if
    /// any.
    ///
    /// # Errors
    ///
    /// With `VALIDATION_ERROR` code if more than one file was sent in this
    /// field.
    pub fn take_file(
        &mut self,
        name: &str,
    ) -> Result<Option<media::File>, Error> {
        let mut files = self.take_files(name);
        if files.len() > 1 {
            return Err(Error::from(ValidationError::InvalidField)
                .with_message(format!("`{name}` field accepts a single file")));
        }
        Ok(files.pop())
    }

    /// Ensures all the files of this [`Form`] have been taken.
    ///
    /// # Errors
    ///
    /// With `VALIDATION_ERROR` code if a file was sent in a field nobody
    /// expects.
    pub fn ensure_files_taken(&self) -> Result<(), Error> {
        match self.files.first() {
            None => Ok(()),
            Some((name, _)) => Err(Error::from(ValidationError::InvalidField)
                .with_message(format!("unexpected file field `{name}`"))),
        }
    }
}

impl AsError for MultipartError {
    fn try_as_error(&self) -> Option<Error> {
        let mut error = Error::from(crate::error::RequestError::Malformed)
            .with_message(self.body_text());
        if self.status() == http::StatusCode::PAYLOAD_TOO_LARGE {
            error.code = "PAYLOAD_TOO_LARGE";
            error.status_code = http::StatusCode::PAYLOAD_TOO_LARGE;
        }
        Some(error)
    }
}

define_error! {
    enum MediaError {
        #[code = "INVALID_IMAGE"]
        #[status = BAD_REQUEST]
        #[message = "Only image files are allowed"]
        NotImage,

        #[code = "IMAGE_TOO_LARGE"]
        #[status = PAYLOAD_TOO_LARGE]
        #[message = "Image file is too large"]
        TooLarge,
    }
}

define_error! {
    enum ValidationError {
        #[code = "MISSING_FIELD"]
        #[status = BAD_REQUEST]
        #[message = "Required field is missing"]
        MissingField,

        #[code = "VALIDATION_ERROR"]
        #[status = BAD_REQUEST]
        #[message = "Invalid field value"]
        InvalidField,

        #[code = "INVALID_PRICE"]
        #[status = BAD_REQUEST]
        #[message = "Price must be a non-negative number"]
        InvalidPrice,

        #[code = "INVALID_DISCOUNT"]
        #[status = BAD_REQUEST]
        #[message = "Discount must be a number within [0, 100]"]
        InvalidDiscount,

        #[code = "INVALID_DATE"]
        #[status = BAD_REQUEST]
        #[message = "Date must be in `YYYY-MM-DD` format"]
        InvalidDate,
    }
}
