//! [SMTP] implementation of [`Mailer`].
//!
//! [SMTP]: https://datatracker.ietf.org/doc/html/rfc5321

use std::{sync::Arc, time};

use common::operations::Deliver;
use derive_more::{Debug, Display, Error as StdError, From};
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport as _, Message, Tokio1Executor,
};
use secrecy::{ExposeSecret as _, SecretString};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::contact::Mail,
    infra::{mailer, Mailer},
};

/// [`Smtp`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Host of the SMTP relay.
    pub host: String,

    /// Port of the SMTP relay.
    pub port: u16,

    /// [`Security`] of the connection to the SMTP relay.
    pub security: Security,

    /// User to authenticate as, if the relay requires authentication.
    pub username: Option<String>,

    /// Password to authenticate with.
    pub password: SecretString,

    /// Sender of all the e-mails, like `Apex Gerüstbau <info@example.ch>`.
    pub from: String,

    /// Timeout of a single SMTP session.
    pub timeout: time::Duration,
}

/// Security of a connection to an SMTP relay.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Security {
    /// Plain connection upgraded with `STARTTLS`.
    #[default]
    StartTls,

    /// Connection wrapped into TLS from the start.
    Tls,

    /// Unencrypted connection, for local relays only.
    Plain,
}

/// [SMTP] relay client.
///
/// [SMTP]: https://datatracker.ietf.org/doc/html/rfc5321
#[derive(Clone, Debug)]
pub struct Smtp {
    /// Transport sending the e-mails.
    #[debug(skip)]
    transport: Arc<AsyncSmtpTransport<Tokio1Executor>>,

    /// Sender of all the e-mails.
    from: Mailbox,
}

impl Smtp {
    /// Creates a new [`Smtp`] client with the provided [`Config`].
    ///
    /// No connection is established until the first e-mail is delivered.
    ///
    /// # Errors
    ///
    /// If the sender address is invalid, or the TLS parameters cannot be
    /// built for the relay host.
    pub fn new(conf: Config) -> Result<Self, Traced<mailer::Error>> {
        let Config {
            host,
            port,
            security,
            username,
            password,
            from,
            timeout,
        } = conf;

        let from = from
            .parse::<Mailbox>()
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;

        let mut builder = match security {
            Security::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&host)
                    .map_err(tracerr::from_and_wrap!(=> Error))
                    .map_err(tracerr::map_from)?
            }
            Security::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&host)
                .map_err(tracerr::from_and_wrap!(=> Error))
                .map_err(tracerr::map_from)?,
            Security::Plain => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&host)
            }
        }
        .port(port)
        .timeout(Some(timeout));
        if let Some(username) = username {
            builder = builder.credentials(Credentials::new(
                username,
                password.expose_secret().to_owned(),
            ));
        }

        Ok(Self {
            transport: Arc::new(builder.build()),
            from,
        })
    }

    /// Builds a [`Message`] out of the provided [`Mail`].
    fn message(&self, mail: Mail) -> Result<Message, Traced<Error>> {
        let Mail {
            to,
            reply_to,
            subject,
            body,
        } = mail;

        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(to
                .as_ref()
                .parse::<Mailbox>()
                .map_err(tracerr::from_and_wrap!(=> Error))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN);
        if let Some(reply_to) = reply_to {
            builder = builder.reply_to(
                reply_to
                    .as_ref()
                    .parse::<Mailbox>()
                    .map_err(tracerr::from_and_wrap!(=> Error))?,
            );
        }
        builder.body(body).map_err(tracerr::from_and_wrap!(=> Error))
    }
}

impl Mailer<Deliver<Mail>> for Smtp {
    type Ok = ();
    type Err = Traced<mailer::Error>;

    async fn execute(
        &self,
        Deliver(mail): Deliver<Mail>,
    ) -> Result<Self::Ok, Self::Err> {
        let to = mail.to.clone();
        let message = self
            .message(mail)
            .map_err(tracerr::map_from_and_wrap!(=> mailer::Error))?;

        _ = self
            .transport
            .send(message)
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        log::debug!("delivered e-mail to `{to}`");
        Ok(())
    }
}

/// [`Smtp`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// E-mail address cannot be parsed.
    #[display("Invalid e-mail address: {_0}")]
    Address(lettre::address::AddressError),

    /// E-mail cannot be assembled.
    #[display("Failed to build e-mail: {_0}")]
    Message(lettre::error::Error),

    /// SMTP session failed.
    #[display("SMTP transport failed: {_0}")]
    Transport(lettre::transport::smtp::Error),
}

#[cfg(test)]
mod spec {
    use std::time;

    use secrecy::SecretString;

    use crate::domain::contact::{Email, Mail};

    use super::{Config, Security, Smtp};

    fn config(from: &str) -> Config {
        Config {
            host: "127.0.0.1".to_owned(),
            port: 2525,
            security: Security::Plain,
            username: None,
            password: SecretString::from(""),
            from: from.to_owned(),
            timeout: time::Duration::from_secs(1),
        }
    }

    #[test]
    fn rejects_invalid_sender() {
        assert!(Smtp::new(config("Apex <info@apex.test>")).is_ok());
        assert!(Smtp::new(config("not an address")).is_err());
    }

    #[test]
    fn builds_plain_text_message() {
        let smtp = Smtp::new(config("Apex <info@apex.test>")).unwrap();

        let message = smtp
            .message(Mail {
                to: Email::new("kunde@example.ch").unwrap(),
                reply_to: Some(Email::new("info@apex.test").unwrap()),
                subject: "Bestätigung".to_owned(),
                body: "Vielen Dank!".to_owned(),
            })
            .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("To: kunde@example.ch"), "{raw}");
        assert!(raw.contains("Reply-To: info@apex.test"), "{raw}");
        assert!(raw.contains("Content-Type: text/plain"), "{raw}");
    }
}
