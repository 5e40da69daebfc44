//! [`Error`]-related definitions.

use std::{fmt, sync::OnceLock};

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::typed_header::TypedHeaderRejection;
use derive_more::Error as StdError;
use serde::Serialize;
use service::infra::{database, mailer, payments, storage};
use tracerr::{Trace, Traced};
use tracing as log;

/// Indicator whether [`Error`] backtraces are rendered into HTTP responses.
static EXPOSE_BACKTRACES: OnceLock<bool> = OnceLock::new();

/// Enables or disables rendering of [`Error`] backtraces into HTTP responses.
///
/// Only the first call has an effect.
pub fn expose_backtraces(enabled: bool) {
    _ = EXPOSE_BACKTRACES.set(enabled);
}

/// Defines a new error type.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_error {
    (
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[status = $status_code:ident]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        /// Error type.
        #[derive(
            Clone,
            Copy,
            Debug,
            ::derive_more::Display,
            ::derive_more::Error
        )]
        #[repr(u16)]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                match err {
                    $(
                        $name::$variant => Self {
                            code: $code,
                            status_code: ::http::StatusCode::$status_code,
                            message: $message.to_string(),
                            backtrace: None,
                        },
                    )*
                }
            }
        }
    };
}

/// HTTP API [`Error`].
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Error`] code.
    pub code: Code,

    /// [`http::StatusCode`] of this [`Error`].
    pub status_code: http::StatusCode,

    /// Backtrace of this [`Error`].
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// [`Error`] message.
    pub message: String,
}

impl Error {
    /// Create a new [`Error`] representing an internal server error.
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        Self {
            code: "INTERNAL_SERVER_ERROR",
            status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            backtrace: None,
        }
    }

    /// Replaces the message of this [`Error`] with the provided one.
    #[must_use]
    pub fn with_message(mut self, msg: impl Into<String>) -> Self {
        self.message = msg.into();
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            code,
            status_code: _,
            backtrace,
            message,
        } = self;

        write!(f, "[{code}]: {message}")?;
        if let Some(trace) = backtrace {
            write!(f, "\n{trace}")?;
        }
        Ok(())
    }
}

/// JSON body of an [`Error`] response.
#[derive(Debug, Serialize)]
struct Body<'e> {
    /// Rendered [`Error`].
    error: Rendered<'e>,
}

/// JSON representation of an [`Error`].
#[derive(Debug, Serialize)]
struct Rendered<'e> {
    /// [`Error::code`].
    code: Code,

    /// [`Error::message`].
    message: &'e str,

    /// Frames of the [`Error::backtrace`], if exposed.
    #[serde(skip_serializing_if = "Option::is_none")]
    backtrace: Option<Vec<String>>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let expose = EXPOSE_BACKTRACES.get().copied().unwrap_or_default();

        if self.status_code.is_server_error() {
            log::error!("{self}");
        }
        let message = if self.status_code.is_server_error() && !expose {
            "Internal server error"
        } else {
            self.message.as_str()
        };

        let body = Body {
            error: Rendered {
                code: self.code,
                message,
                backtrace: expose
                    .then_some(self.backtrace.as_ref())
                    .flatten()
                    .map(|trace| {
                        trace.iter().map(ToString::to_string).collect()
                    }),
            },
        };
        (self.status_code, Json(body)).into_response()
    }
}

/// [`Error`] code.
pub type Code = &'static str;

/// Helper trait for converting types into [`Error`]s.
pub trait AsError {
    /// Tries to convert the type into an [`Error`].
    ///
    /// [`None`] is returned if the type cannot be converted into an [`Error`].
    fn try_as_error(&self) -> Option<Error>;

    /// Converts the type into an [`Error`].
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error()
            .unwrap_or_else(|| Error::internal(&self))
    }

    /// Converts the type into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError + fmt::Display> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        let mut error = self.as_ref().try_as_error()?;
        error.backtrace = Some(self.trace().clone());
        Some(error)
    }

    fn as_error(&self) -> Error {
        let inner: &E = self.as_ref();
        let mut error = inner
            .try_as_error()
            .unwrap_or_else(|| Error::internal(inner));
        error.backtrace = Some(self.trace().clone());
        error
    }
}

define_error! {
    enum RequestError {
        #[code = "BAD_REQUEST"]
        #[status = BAD_REQUEST]
        #[message = "Malformed request"]
        Malformed,
    }
}

define_error! {
    enum UpstreamError {
        #[code = "UPSTREAM_ERROR"]
        #[status = BAD_GATEWAY]
        #[message = "External service failed to process the request"]
        Failed,
    }
}

impl AsError for TypedHeaderRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::from(RequestError::Malformed).with_message(self.to_string()))
    }
}

impl AsError for JsonRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(
            Error::from(RequestError::Malformed)
                .with_message(self.body_text()),
        )
    }
}

impl AsError for PathRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(
            Error::from(RequestError::Malformed)
                .with_message(self.body_text()),
        )
    }
}

impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

impl AsError for storage::Error {
    fn try_as_error(&self) -> Option<Error> {
        log::error!("`Storage` failed: {self}");
        Some(UpstreamError::Failed.into())
    }
}

impl AsError for payments::Error {
    fn try_as_error(&self) -> Option<Error> {
        log::error!("`Payments` failed: {self}");
        Some(UpstreamError::Failed.into())
    }
}

impl AsError for mailer::Error {
    fn try_as_error(&self) -> Option<Error> {
        log::error!("`Mailer` failed: {self}");
        Some(UpstreamError::Failed.into())
    }
}

#[cfg(test)]
mod spec {
    use axum::response::IntoResponse as _;
    use http_body_util::BodyExt as _;

    use super::{Error, RequestError};

    #[tokio::test]
    async fn renders_json_body() {
        let resp = Error::from(RequestError::Malformed)
            .with_message("Missing `title` field")
            .into_response();

        assert_eq!(resp.status(), http::StatusCode::BAD_REQUEST);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
        assert_eq!(json["error"]["message"], "Missing `title` field");
        assert!(json["error"].get("backtrace").is_none());
    }

    #[tokio::test]
    async fn hides_internal_details() {
        let resp = Error::internal(&"connection refused").into_response();

        assert_eq!(resp.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "INTERNAL_SERVER_ERROR");
        assert_eq!(json["error"]["message"], "Internal server error");
    }
}
