//! Contact form HTTP API.

use axum::{extract::rejection::JsonRejection, Extension, Json};
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::contact,
};

use crate::{api::form::ValidationError, define_error, AsError, Context, Error};

/// Request of [`send()`].
#[derive(Debug, Deserialize)]
pub struct Message {
    /// Name of the customer.
    pub name: Option<String>,

    /// E-mail of the customer.
    pub email: Option<String>,

    /// Phone number of the customer.
    pub phone: Option<String>,

    /// Subject of the request.
    pub subject: Option<String>,

    /// Text of the request.
    pub message: Option<String>,
}

/// Response of [`send()`].
#[derive(Debug, Serialize)]
pub struct Sent {
    /// Always `true`.
    pub success: bool,

    /// Human-readable message for the customer.
    pub message: &'static str,

    /// Non-fatal problems occurred while sending.
    pub warnings: Vec<String>,
}

/// Relays a message from the contact form to the company, and confirms its
/// receipt to the customer by e-mail.
///
/// # Errors
///
/// Possible error codes:
/// - `MISSING_FIELD` - `name`, `email` or `message` is absent;
/// - `INVALID_EMAIL` - `email` is malformed;
/// - `VALIDATION_ERROR` - `message` is too short, or some other field is
///   invalid;
/// - `UPSTREAM_ERROR` - e-mail cannot be delivered to the company.
#[tracing::instrument(skip_all, fields(http.handler = "sendContactMessage"))]
pub async fn send(
    Extension(ctx): Extension<Context>,
    req: Result<Json<Message>, JsonRejection>,
) -> Result<Json<Sent>, Error> {
    let Json(Message {
        name,
        email,
        phone,
        subject,
        message,
    }) = req.map_err(AsError::into_error)?;

    let blank = |v: &Option<String>| {
        v.as_deref().map_or(true, |v| v.trim().is_empty())
    };
    if blank(&name) || blank(&email) || blank(&message) {
        return Err(ContactError::MissingFields.into());
    }
    let invalid = |field: &str| {
        Error::from(ValidationError::InvalidField)
            .with_message(format!("`{field}` field is invalid"))
    };

    let cmd = command::SendContactMessage {
        name: name
            .and_then(contact::Name::new)
            .ok_or_else(|| invalid("name"))?,
        email: email
            .and_then(contact::Email::new)
            .ok_or_else(|| Error::from(ContactError::InvalidEmail))?,
        phone: phone
            .filter(|p| !p.trim().is_empty())
            .map(|p| contact::Phone::new(p).ok_or_else(|| invalid("phone")))
            .transpose()?,
        subject: subject
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                contact::Subject::new(s).ok_or_else(|| invalid("subject"))
            })
            .transpose()?,
        message: message
            .and_then(contact::Text::new)
            .ok_or_else(|| Error::from(ContactError::InvalidMessage))?,
    };

    let warning = ctx
        .service()
        .execute(cmd)
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Sent {
        success: true,
        message: "Ihre Nachricht wurde erfolgreich gesendet. Sie erhalten \
                  eine Bestätigungsemail.",
        warnings: warning.iter().map(ToString::to_string).collect(),
    }))
}

impl AsError for command::send_contact_message::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Mailer(e) => e.try_as_error().map(|e| {
                e.with_message(
                    "Es gab ein Problem beim Senden Ihrer Nachricht. Bitte \
                     versuchen Sie es später erneut.",
                )
            }),
        }
    }
}

define_error! {
    enum ContactError {
        #[code = "MISSING_FIELD"]
        #[status = BAD_REQUEST]
        #[message = "Name, email, and message are required"]
        MissingFields,

        #[code = "INVALID_EMAIL"]
        #[status = BAD_REQUEST]
        #[message = "Please provide a valid email address"]
        InvalidEmail,

        #[code = "VALIDATION_ERROR"]
        #[status = BAD_REQUEST]
        #[message = "Message must be from 10 to 10000 characters long"]
        InvalidMessage,
    }
}
