//! [`Command`] for relaying a contact form message to the company.

use std::fmt::Write as _;

use common::operations::Deliver;
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::contact::{self, Email, Mail},
    infra::{mailer, Mailer},
    Service,
};

use super::{Command, Warning};

/// Configuration of [`SendContactMessage`].
#[derive(Clone, Debug)]
pub struct Config {
    /// Name of the company signing the confirmation e-mails.
    pub company: String,

    /// [`Email`] of the company receiving the contact requests.
    pub recipient: Email,
}

/// [`Command`] for relaying a message from the storefront contact form to the
/// company, and confirming its receipt to the customer.
#[derive(Clone, Debug)]
pub struct SendContactMessage {
    /// [`contact::Name`] of the customer.
    pub name: contact::Name,

    /// [`Email`] of the customer.
    pub email: Email,

    /// [`contact::Phone`] of the customer, if provided.
    pub phone: Option<contact::Phone>,

    /// [`contact::Subject`] of the request, if provided.
    pub subject: Option<contact::Subject>,

    /// [`contact::Text`] of the request.
    pub message: contact::Text,
}

impl SendContactMessage {
    /// Composes the [`Mail`] notifying the company about this request.
    fn notification(&self, conf: &Config) -> Mail {
        let Self {
            name,
            email,
            phone,
            subject,
            message,
        } = self;

        let mut body = format!(
            "Neue Kontaktanfrage von der Website\n\n\
             Name: {name}\n\
             E-Mail: {email}\n",
        );
        if let Some(phone) = phone {
            _ = writeln!(body, "Telefon: {phone}");
        }
        if let Some(subject) = subject {
            _ = writeln!(body, "Betreff: {subject}");
        }
        _ = write!(
            body,
            "\nNachricht:\n{message}\n\n--\n\
             Diese Nachricht wurde automatisch von der {} Website gesendet.\n",
            conf.company,
        );

        Mail {
            to: conf.recipient.clone(),
            reply_to: Some(email.clone()),
            subject: format!(
                "Neue Kontaktanfrage: {}",
                subject.as_ref().map_or("Allgemeine Anfrage", AsRef::as_ref),
            ),
            body,
        }
    }

    /// Composes the [`Mail`] confirming the receipt of this request to the
    /// customer.
    fn confirmation(&self, conf: &Config) -> Mail {
        let Self {
            name,
            email,
            message,
            ..
        } = self;
        let company = &conf.company;

        Mail {
            to: email.clone(),
            reply_to: Some(conf.recipient.clone()),
            subject: format!("Bestätigung Ihrer Anfrage - {company}"),
            body: format!(
                "Vielen Dank für Ihre Nachricht!\n\n\
                 Hallo {name},\n\n\
                 Wir haben Ihre Nachricht erhalten und werden uns innerhalb \
                 von 24 Stunden bei Ihnen melden.\n\n\
                 Ihre Nachricht:\n{message}\n\n\
                 Mit freundlichen Grüßen,\n\
                 Das Team von {company}\n",
            ),
        }
    }
}

impl<Db, St, Pay, Ml> Command<SendContactMessage>
    for Service<Db, St, Pay, Ml>
where
    Ml: Mailer<Deliver<Mail>, Ok = (), Err = Traced<mailer::Error>>,
{
    type Ok = Option<Warning>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SendContactMessage,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let conf = &self.config().contact;

        self.mailer()
            .execute(Deliver(cmd.notification(conf)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // The request has reached the company at this point, so a failed
        // confirmation doesn't fail it.
        let confirmation = cmd.confirmation(conf);
        let Err(e) = self.mailer().execute(Deliver(confirmation)).await else {
            return Ok(None);
        };
        log::warn!(
            "failed to confirm contact request to `{}`: {e}",
            cmd.email,
        );
        Ok(Some(Warning(
            "confirmation e-mail could not be delivered".to_owned(),
        )))
    }
}

/// Error of [`SendContactMessage`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Mailer`] error.
    #[display("`Mailer` operation failed: {_0}")]
    Mailer(mailer::Error),
}
