//! [`Context`]-related definitions.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    middleware::Next,
    response::Response,
    Extension, RequestPartsExt as _,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use common::DateTime;
use service::{
    command::{self, Command as _},
    domain::admin::{self, session},
};

use crate::{define_error, AsError, Error, Service};

/// Application context shared by all the request handlers.
#[derive(Clone, Debug)]
pub struct Context {
    /// [`Service`] instance.
    service: Service,

    /// [`Settings`] of the HTTP API.
    settings: Arc<Settings>,
}

/// Settings of the HTTP API not belonging to the [`Service`].
#[derive(Clone, Debug)]
pub struct Settings {
    /// Maximum size of a single uploaded image in bytes.
    pub max_file_size: usize,

    /// Maximum size of a whole request body in bytes.
    pub max_body_size: usize,

    /// Publishable key of the payment processor handed to the storefront.
    pub publishable_key: String,
}

impl Context {
    /// Creates a new [`Context`] out of the provided [`Service`] and
    /// [`Settings`].
    #[must_use]
    pub fn new(service: Service, settings: Settings) -> Self {
        Self {
            service,
            settings: Arc::new(settings),
        }
    }

    /// Returns [`Service`] instance of this [`Context`].
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Returns [`Settings`] of this [`Context`].
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

/// Verified administrator session.
#[derive(Clone, Debug)]
pub struct Session {
    /// [`admin::Username`] the [`Session`] was issued to.
    pub username: admin::Username,

    /// [`DateTime`] when this [`Session`] was issued.
    pub issued_at: DateTime,

    /// [`DateTime`] when this [`Session`] expires.
    pub expires_at: DateTime,
}

impl From<admin::Session> for Session {
    fn from(session: admin::Session) -> Self {
        Self {
            username: session.username,
            issued_at: session.issued_at.coerce(),
            expires_at: session.expires_at.coerce(),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| AuthError::AuthorizationRequired.into())
    }
}

/// Middleware letting through only requests bearing a valid administrator
/// token.
///
/// Runs before the handler, so a rejected request has its body left unread
/// and causes no side effects. A verified [`Session`] is put into the request
/// extensions.
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - no bearer token provided;
/// - `INVALID_TOKEN` - token is malformed, forged or expired;
/// - `WRONG_PRINCIPAL` - token was issued to someone else.
pub async fn authorize(
    Extension(ctx): Extension<Context>,
    req: Request,
    next: Next,
) -> Result<Response, Error> {
    let (mut parts, body) = req.into_parts();

    let TypedHeader(Authorization(bearer)) = parts
        .extract::<TypedHeader<Authorization<Bearer>>>()
        .await
        .map_err(|e| {
            if e.is_missing() {
                AuthError::AuthorizationRequired.into()
            } else {
                Error::from(AuthError::InvalidToken)
            }
        })?;

    #[expect(unsafe_code, reason = "specified in correct header")]
    let token = unsafe { session::Token::new_unchecked(bearer.token().to_owned()) };
    let session = ctx
        .service()
        .execute(command::AuthorizeAdminSession { token })
        .await
        .map_err(AsError::into_error)?;

    drop(parts.extensions.insert(Session::from(session)));
    Ok(next.run(Request::from_parts(parts, body)).await)
}

impl AsError for command::authorize_admin_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::InvalidToken(_) => AuthError::InvalidToken.into(),
            Self::WrongPrincipal(_) => AuthError::WrongPrincipal.into(),
        })
    }
}

define_error! {
    enum AuthError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Authorization required"]
        AuthorizationRequired,

        #[code = "INVALID_TOKEN"]
        #[status = UNAUTHORIZED]
        #[message = "Invalid or expired token"]
        InvalidToken,

        #[code = "WRONG_PRINCIPAL"]
        #[status = FORBIDDEN]
        #[message = "Token doesn't belong to the administrator"]
        WrongPrincipal,
    }
}
