//! [`Command`] for creating an administrator [`Session`].

use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret as _, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::admin::session::Token;
use crate::{
    domain::admin::{self, session, Session},
    Service,
};

use super::Command;

/// [`Command`] for creating an administrator [`Session`] by credentials.
#[derive(Debug)]
pub struct CreateAdminSession {
    /// Claimed username of the administrator.
    pub username: String,

    /// [`admin::Password`] of the administrator.
    pub password: SecretBox<admin::Password>,
}

/// Output of [`CreateAdminSession`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`Token`] of the created [`Session`].
    pub token: session::Token,

    /// Created [`Session`] itself.
    pub session: Session,
}

impl<Db, St, Pay, Ml> Command<CreateAdminSession> for Service<Db, St, Pay, Ml> {
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateAdminSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateAdminSession { username, password } = cmd;
        let admin = &self.config().admin;

        // Both checks are always performed, so a wrong username is
        // indistinguishable from a wrong password.
        let username_matches =
            AsRef::<str>::as_ref(&admin.username) == username.as_str();
        let password_matches =
            admin.password_hash.verify(password.expose_secret());
        if !(username_matches & password_matches) {
            return Err(tracerr::new!(E::InvalidCredentials));
        }

        let session = Session::issue(admin.username.clone());
        let token = jsonwebtoken::encode::<Session>(
            &jsonwebtoken::Header::default(),
            &session,
            &self.config().jwt_encoding_key,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        // SAFETY: `jsonwebtoken::encode` always returns a valid
        //         `session::Token`.
        #[expect(unsafe_code, reason = "invariants are preserved")]
        let token = unsafe { session::Token::new_unchecked(token) };

        Ok(Output { token, session })
    }
}

/// Error of [`CreateAdminSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`jsonwebtoken`] encoding error.
    #[display("Failed to encode a JSON Web Token: {_0}")]
    JsonWebTokenEncodeError(jsonwebtoken::errors::Error),

    /// Provided credentials don't match the administrator.
    #[display("Invalid administrator credentials")]
    InvalidCredentials,
}

#[cfg(test)]
mod spec {
    use secrecy::SecretBox;

    use crate::{
        command::{AuthorizeAdminSession, Command as _},
        domain::admin,
        spec::service,
    };

    use super::{CreateAdminSession, ExecutionError};

    fn credentials(username: &str, password: &str) -> CreateAdminSession {
        CreateAdminSession {
            username: username.to_owned(),
            password: SecretBox::new(Box::new(admin::Password::from(password))),
        }
    }

    #[tokio::test]
    async fn issued_token_verifies() {
        let (svc, _) = service();

        let output =
            svc.execute(credentials("Apex", "apex12345")).await.unwrap();
        let session = svc
            .execute(AuthorizeAdminSession {
                token: output.token,
            })
            .await
            .unwrap();

        assert_eq!(session.username.to_string(), "Apex");
        assert_eq!(
            session.expires_at.unix_timestamp()
                - session.issued_at.unix_timestamp(),
            24 * 60 * 60,
        );
    }

    #[tokio::test]
    async fn rejects_wrong_credentials() {
        let (svc, _) = service();

        for (username, password) in [
            ("Apex", "wrong"),
            ("apex", "apex12345"),
            ("Admin", "apex12345"),
            ("", ""),
        ] {
            let err = svc
                .execute(credentials(username, password))
                .await
                .unwrap_err();
            assert!(
                matches!(err.as_ref(), ExecutionError::InvalidCredentials),
                "`{username}`/`{password}`: {err}",
            );
        }
    }
}
