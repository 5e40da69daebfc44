//! [`Command`] for authorizing an administrator [`Session`].

use derive_more::{Display, Error, From};
use jsonwebtoken::{Algorithm, Validation};
use tracerr::Traced;

use crate::{
    domain::admin::{self, session, Session},
    Service,
};

use super::Command;

/// [`Command`] for authorizing an administrator [`Session`] by its
/// [`session::Token`].
#[derive(Clone, Debug, From)]
pub struct AuthorizeAdminSession {
    /// [`Session`] token to authorize.
    pub token: session::Token,
}

impl<Db, St, Pay, Ml> Command<AuthorizeAdminSession>
    for Service<Db, St, Pay, Ml>
{
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeAdminSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeAdminSession { token } = cmd;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let session = jsonwebtoken::decode::<Session>(
            token.as_ref(),
            &self.config().jwt_decoding_key,
            &validation,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?
        .claims;

        if session.username != self.config().admin.username {
            return Err(tracerr::new!(E::WrongPrincipal(session.username)));
        }

        Ok(session)
    }
}

/// Error of [`AuthorizeAdminSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`session::Token`] is malformed, signed with a different secret or
    /// expired.
    #[display("Invalid `session::Token`: {_0}")]
    InvalidToken(jsonwebtoken::errors::Error),

    /// [`Session`] was issued to someone else than the administrator.
    #[display("`Session` belongs to unknown `{_0}`")]
    #[from(ignore)]
    WrongPrincipal(#[error(not(source))] admin::Username),
}
