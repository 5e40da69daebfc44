//! Administrator authentication HTTP API.

use axum::{extract::rejection::JsonRejection, Extension, Json};
use serde::{Deserialize, Serialize};
use service::command::{self, Command as _};

use crate::{define_error, AsError, Context, Error, Session};

/// Credentials submitted to [`login()`].
#[derive(Debug, Deserialize)]
pub struct Credentials {
    /// Claimed administrator username.
    pub username: String,

    /// Administrator password.
    pub password: String,
}

/// Response to a successful [`login()`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedIn {
    /// Always `true`.
    pub success: bool,

    /// Bearer token to authorize the administrator requests with.
    pub token: String,

    /// [RFC 3339] date and time when the `token` expires.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub expires_at: String,
}

/// Response to a successful [`verify()`].
#[derive(Debug, Serialize)]
pub struct Verified {
    /// Always `true`.
    pub success: bool,

    /// Claims of the verified token.
    pub admin: Claims,
}

/// Claims of an administrator token.
#[derive(Debug, Serialize)]
pub struct Claims {
    /// Administrator username.
    pub username: String,

    /// Unix timestamp of the token issuance.
    pub iat: i64,

    /// Unix timestamp of the token expiration.
    pub exp: i64,
}

/// Issues a new administrator token for the provided [`Credentials`].
///
/// # Errors
///
/// Possible error codes:
/// - `INVALID_CREDENTIALS` - username or password is wrong;
/// - `BAD_REQUEST` - body is not valid [`Credentials`] JSON.
#[tracing::instrument(skip_all, fields(http.handler = "login"))]
pub async fn login(
    Extension(ctx): Extension<Context>,
    creds: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<LoggedIn>, Error> {
    let Json(Credentials { username, password }) =
        creds.map_err(AsError::into_error)?;

    let command::create_admin_session::Output { token, session } = ctx
        .service()
        .execute(command::CreateAdminSession {
            username,
            password: secrecy::SecretBox::init_with(move || password.into()),
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(LoggedIn {
        success: true,
        token: token.to_string(),
        expires_at: session.expires_at.to_rfc3339(),
    }))
}

/// Returns the claims of the bearer token, once the guard let it through.
///
/// # Errors
///
/// Same as the [`authorize()`] guard.
///
/// [`authorize()`]: crate::context::authorize
#[expect(
    clippy::unused_async,
    reason = "`async` is required to match signature"
)]
#[tracing::instrument(skip_all, fields(http.handler = "verify"))]
pub async fn verify(session: Session) -> Json<Verified> {
    Json(Verified {
        success: true,
        admin: Claims {
            username: session.username.to_string(),
            iat: session.issued_at.unix_timestamp(),
            exp: session.expires_at.unix_timestamp(),
        },
    })
}

impl AsError for command::create_admin_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::InvalidCredentials => {
                Some(CredentialsError::Invalid.into())
            }
            Self::JsonWebTokenEncodeError(_) => None,
        }
    }
}

define_error! {
    enum CredentialsError {
        #[code = "INVALID_CREDENTIALS"]
        #[status = UNAUTHORIZED]
        #[message = "Invalid credentials"]
        Invalid,
    }
}
