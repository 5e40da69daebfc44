//! Payments HTTP API.

use std::{collections::BTreeMap, str::FromStr as _};

use axum::{extract::rejection::JsonRejection, Extension, Json};
use common::{Currency, Money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{payment, PaymentIntent},
};
use strum::IntoEnumIterator as _;

use crate::{define_error, AsError, Context, Error};

/// Request of [`create_intent()`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIntent {
    /// Amount to collect in major units of the `currency`.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,

    /// Lowercase ISO 4217 code of the currency, `chf` by default.
    pub currency: Option<String>,

    /// Description of the payment.
    pub description: Option<String>,

    /// E-mail of the customer.
    pub customer_email: Option<String>,

    /// Arbitrary metadata attached to the payment.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// Response of [`create_intent()`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedIntent {
    /// Secret letting the browser complete the payment.
    pub client_secret: Option<String>,

    /// ID of the created payment intent.
    pub payment_intent_id: String,
}

/// Request of [`confirm()`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    /// ID of the payment intent to confirm.
    pub payment_intent_id: Option<String>,
}

/// Response of [`confirm()`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmed {
    /// Always `true`.
    pub success: bool,

    /// Human-readable message for the customer.
    pub message: &'static str,

    /// Confirmed payment intent.
    pub payment_intent: Intent,
}

/// Payment intent as returned to clients.
#[derive(Debug, Serialize)]
pub struct Intent {
    /// ID of this [`Intent`].
    pub id: String,

    /// Amount of this [`Intent`] in minor currency units.
    pub amount: i64,

    /// Lowercase ISO 4217 currency code.
    pub currency: Currency,

    /// Status of this [`Intent`].
    pub status: payment::Status,
}

impl From<PaymentIntent> for Intent {
    fn from(intent: PaymentIntent) -> Self {
        Self {
            id: intent.id.to_string(),
            amount: intent.amount,
            currency: intent.currency,
            status: intent.status,
        }
    }
}

/// Request of [`create_checkout_session()`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCheckoutSession {
    /// Items to pay for.
    #[serde(default)]
    pub items: Vec<Item>,

    /// E-mail of the customer.
    pub customer_email: Option<String>,

    /// URL to redirect to after a successful payment.
    pub success_url: Option<String>,

    /// URL to redirect to after a cancelled payment.
    pub cancel_url: Option<String>,
}

/// Item of a [`NewCheckoutSession`].
#[derive(Debug, Deserialize)]
pub struct Item {
    /// Name of this [`Item`].
    pub name: String,

    /// Description of this [`Item`].
    pub description: Option<String>,

    /// Price of a single unit of this [`Item`] in CHF.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// Number of units, `1` by default.
    pub quantity: Option<u32>,

    /// Public URLs of this [`Item`] images.
    #[serde(default)]
    pub images: Vec<String>,
}

/// Response of [`create_checkout_session()`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedCheckoutSession {
    /// ID of the created checkout session.
    pub session_id: String,

    /// URL of the hosted checkout page.
    pub url: Option<String>,
}

/// Response of [`config()`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Publishable key of the payment processor.
    pub publishable_key: String,

    /// Default currency.
    pub currency: Currency,

    /// All the accepted currencies.
    pub supported_currencies: Vec<Currency>,
}

/// Response of [`methods()`].
#[derive(Debug, Serialize)]
pub struct Methods {
    /// Accepted payment methods.
    pub methods: [payment::Method; 2],
}

/// Creates a new payment intent to be completed in the customer's browser.
///
/// # Errors
///
/// Possible error codes:
/// - `MISSING_FIELD` - `amount`, `description` or `customerEmail` is absent;
/// - `INVALID_AMOUNT` - `amount` is not positive;
/// - `INVALID_CURRENCY` - `currency` is not supported;
/// - `INVALID_EMAIL` - `customerEmail` is malformed;
/// - `UPSTREAM_ERROR` - payment processor failed.
#[tracing::instrument(skip_all, fields(http.handler = "createPaymentIntent"))]
pub async fn create_intent(
    Extension(ctx): Extension<Context>,
    req: Result<Json<NewIntent>, JsonRejection>,
) -> Result<Json<CreatedIntent>, Error> {
    let Json(NewIntent {
        amount,
        currency,
        description,
        customer_email,
        metadata,
    }) = req.map_err(AsError::into_error)?;

    let (Some(amount), Some(description), Some(customer_email)) =
        (amount, description, customer_email)
    else {
        return Err(Error::from(PaymentError::MissingFields));
    };
    let currency = currency
        .map(|c| Currency::from_str(&c))
        .transpose()
        .map_err(|_| Error::from(PaymentError::InvalidCurrency))?
        .unwrap_or_default();
    let description = payment::Description::new(description)
        .ok_or_else(|| Error::from(PaymentError::MissingFields))?;
    let customer_email = payment::Email::new(customer_email)
        .ok_or_else(|| Error::from(PaymentError::InvalidEmail))?;

    let intent = ctx
        .service()
        .execute(command::CreatePaymentIntent {
            amount: Money { amount, currency },
            description,
            customer_email,
            metadata,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(CreatedIntent {
        client_secret: intent.client_secret.map(|s| s.to_string()),
        payment_intent_id: intent.id.to_string(),
    }))
}

/// Confirms that the payment intent has succeeded.
///
/// # Errors
///
/// Possible error codes:
/// - `MISSING_FIELD` - `paymentIntentId` is absent;
/// - `PAYMENT_NOT_FOUND` - payment intent doesn't exist;
/// - `PAYMENT_NOT_COMPLETED` - payment intent hasn't succeeded;
/// - `UPSTREAM_ERROR` - payment processor failed.
#[tracing::instrument(skip_all, fields(http.handler = "confirmPayment"))]
pub async fn confirm(
    Extension(ctx): Extension<Context>,
    req: Result<Json<Confirmation>, JsonRejection>,
) -> Result<Json<Confirmed>, Error> {
    let Json(Confirmation { payment_intent_id }) =
        req.map_err(AsError::into_error)?;
    let id = payment_intent_id
        .and_then(payment::IntentId::new)
        .ok_or_else(|| Error::from(PaymentError::MissingIntentId))?;

    let intent = ctx
        .service()
        .execute(command::ConfirmPayment { id })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Confirmed {
        success: true,
        message: "Zahlung erfolgreich abgeschlossen",
        payment_intent: intent.into(),
    }))
}

/// Creates a new hosted checkout session for the provided items.
///
/// # Errors
///
/// Possible error codes:
/// - `INVALID_ITEMS` - no items, or some item is invalid;
/// - `INVALID_EMAIL` - `customerEmail` is malformed;
/// - `UPSTREAM_ERROR` - payment processor failed.
#[tracing::instrument(skip_all, fields(http.handler = "createCheckoutSession"))]
pub async fn create_checkout_session(
    Extension(ctx): Extension<Context>,
    req: Result<Json<NewCheckoutSession>, JsonRejection>,
) -> Result<Json<CreatedCheckoutSession>, Error> {
    let Json(NewCheckoutSession {
        items,
        customer_email,
        success_url,
        cancel_url,
    }) = req.map_err(AsError::into_error)?;

    let customer_email = customer_email
        .map(|e| {
            payment::Email::new(e)
                .ok_or_else(|| Error::from(PaymentError::InvalidEmail))
        })
        .transpose()?;
    let items = items
        .into_iter()
        .map(|i| {
            Ok(payment::LineItem {
                name: payment::Description::new(i.name)
                    .ok_or_else(|| Error::from(PaymentError::InvalidItems))?,
                description: i.description.filter(|d| !d.trim().is_empty()),
                unit_price: Money {
                    amount: i.price,
                    currency: Currency::Chf,
                },
                quantity: i.quantity.unwrap_or(1),
                images: i.images,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let session = ctx
        .service()
        .execute(command::CreateCheckoutSession {
            items,
            customer_email,
            success_url,
            cancel_url,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(CreatedCheckoutSession {
        session_id: session.id,
        url: session.url,
    }))
}

/// Returns the public configuration of the payment processor.
#[expect(
    clippy::unused_async,
    reason = "`async` is required to match signature"
)]
pub async fn config(Extension(ctx): Extension<Context>) -> Json<Config> {
    Json(Config {
        publishable_key: ctx.settings().publishable_key.clone(),
        currency: Currency::default(),
        supported_currencies: Currency::iter().collect(),
    })
}

/// Returns the accepted payment methods.
#[expect(
    clippy::unused_async,
    reason = "`async` is required to match signature"
)]
pub async fn methods() -> Json<Methods> {
    Json(Methods {
        methods: payment::Method::ALL,
    })
}

impl AsError for command::create_payment_intent::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Payments(e) => e.try_as_error(),
            Self::InvalidAmount(_) => Some(PaymentError::InvalidAmount.into()),
        }
    }
}

impl AsError for command::confirm_payment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Payments(e) => e.try_as_error(),
            Self::NotFound(_) => Some(PaymentError::NotFound.into()),
            Self::NotCompleted(status) => Some(
                Error::from(PaymentError::NotCompleted).with_message(format!(
                    "Die Zahlung wurde nicht erfolgreich abgeschlossen \
                     ({status})",
                )),
            ),
        }
    }
}

impl AsError for command::create_checkout_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Payments(e) => e.try_as_error(),
            Self::NoItems | Self::InvalidItem(_) => Some(
                Error::from(PaymentError::InvalidItems)
                    .with_message(self.to_string()),
            ),
        }
    }
}

define_error! {
    enum PaymentError {
        #[code = "MISSING_FIELD"]
        #[status = BAD_REQUEST]
        #[message = "Amount, description and customer email are required"]
        MissingFields,

        #[code = "MISSING_FIELD"]
        #[status = BAD_REQUEST]
        #[message = "Payment intent ID is required"]
        MissingIntentId,

        #[code = "INVALID_AMOUNT"]
        #[status = BAD_REQUEST]
        #[message = "Amount must be greater than 0"]
        InvalidAmount,

        #[code = "INVALID_CURRENCY"]
        #[status = BAD_REQUEST]
        #[message = "Currency is not supported"]
        InvalidCurrency,

        #[code = "INVALID_EMAIL"]
        #[status = BAD_REQUEST]
        #[message = "Please provide a valid email address"]
        InvalidEmail,

        #[code = "INVALID_ITEMS"]
        #[status = BAD_REQUEST]
        #[message = "Valid items array is required"]
        InvalidItems,

        #[code = "PAYMENT_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "Payment intent doesn't exist"]
        NotFound,

        #[code = "PAYMENT_NOT_COMPLETED"]
        #[status = BAD_REQUEST]
        #[message = "Payment is not completed"]
        NotCompleted,
    }
}
