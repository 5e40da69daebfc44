//! Payment definitions.

use std::{collections::BTreeMap, str::FromStr, sync::LazyLock};

use common::{Currency, Money};
use derive_more::{AsRef, Display};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Intent to collect a [`Money`] amount from a customer.
#[derive(Clone, Debug)]
pub struct PaymentIntent {
    /// ID of this [`PaymentIntent`].
    pub id: IntentId,

    /// [`ClientSecret`] letting the customer's browser complete this
    /// [`PaymentIntent`], if the processor returned it.
    pub client_secret: Option<ClientSecret>,

    /// Amount of this [`PaymentIntent`] in minor units of its [`Currency`].
    pub amount: i64,

    /// [`Currency`] of this [`PaymentIntent`].
    pub currency: Currency,

    /// Current [`Status`] of this [`PaymentIntent`].
    pub status: Status,
}

/// Parameters of a new [`PaymentIntent`].
#[derive(Clone, Debug)]
pub struct NewPaymentIntent {
    /// [`Money`] amount to collect.
    pub amount: Money,

    /// [`Description`] of the payment.
    pub description: Description,

    /// [`Email`] the receipt is sent to.
    pub customer_email: Email,

    /// Arbitrary key-value metadata attached to the payment.
    pub metadata: BTreeMap<String, String>,
}

/// ID of a [`PaymentIntent`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str)]
pub struct IntentId(String);

impl IntentId {
    /// Creates a new [`IntentId`] if the provided `id` is not blank.
    #[must_use]
    pub fn new(id: impl AsRef<str>) -> Option<Self> {
        let id = id.as_ref().trim();
        (!id.is_empty() && !id.contains(['/', '?', '#']))
            .then(|| Self(id.to_owned()))
    }
}

/// Secret of a [`PaymentIntent`] handed over to the customer's browser.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str)]
pub struct ClientSecret(String);

impl From<String> for ClientSecret {
    fn from(secret: String) -> Self {
        Self(secret)
    }
}

/// Status of a [`PaymentIntent`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    Hash,
    PartialEq,
    Serialize,
    strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Status {
    /// Payment method is required.
    RequiresPaymentMethod,

    /// Confirmation is required.
    RequiresConfirmation,

    /// Customer action (3-D Secure, etc.) is required.
    RequiresAction,

    /// Payment is being processed.
    Processing,

    /// Funds are authorized, but not captured yet.
    RequiresCapture,

    /// Payment was canceled.
    Canceled,

    /// Payment succeeded.
    Succeeded,
}

/// Hosted checkout page collecting a payment for some [`LineItem`]s.
#[derive(Clone, Debug)]
pub struct CheckoutSession {
    /// ID of this [`CheckoutSession`].
    pub id: String,

    /// URL of the hosted checkout page, if any.
    pub url: Option<String>,
}

/// Parameters of a new [`CheckoutSession`].
#[derive(Clone, Debug)]
pub struct NewCheckoutSession {
    /// [`LineItem`]s to pay for.
    pub items: Vec<LineItem>,

    /// [`Email`] of the customer, if known in advance.
    pub customer_email: Option<Email>,

    /// URL the customer is redirected to after a successful payment.
    pub success_url: String,

    /// URL the customer is redirected to after cancelling the payment.
    pub cancel_url: String,
}

/// Single purchased position of a [`CheckoutSession`].
#[derive(Clone, Debug)]
pub struct LineItem {
    /// Name of the purchased item.
    pub name: Description,

    /// Optional description of the purchased item.
    pub description: Option<String>,

    /// Price of a single unit of the item.
    pub unit_price: Money,

    /// Number of purchased units.
    pub quantity: u32,

    /// Public URLs of the item images.
    pub images: Vec<String>,
}

/// Customer e-mail address.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str)]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`] if the provided `email` looks like an e-mail
    /// address.
    #[must_use]
    pub fn new(email: impl AsRef<str>) -> Option<Self> {
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex")
        });

        let email = email.as_ref().trim();
        REGEX.is_match(email).then(|| Self(email.to_owned()))
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// Non-empty human-readable description of a payment.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str)]
pub struct Description(String);

impl Description {
    /// Creates a new [`Description`] if the provided `text` is not blank.
    #[must_use]
    pub fn new(text: impl AsRef<str>) -> Option<Self> {
        let text = text.as_ref().trim();
        (!text.is_empty()).then(|| Self(text.to_owned()))
    }
}

/// Payment method offered to customers.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Method {
    /// ID of this [`Method`] as known to the payment processor.
    pub id: &'static str,

    /// Display name of this [`Method`].
    pub name: &'static str,

    /// Short description of this [`Method`].
    pub description: &'static str,
}

impl Method {
    /// All the [`Method`]s accepted by the storefront.
    pub const ALL: [Self; 2] = [
        Self {
            id: "card",
            name: "Kreditkarte / Debitkarte",
            description: "Visa, Mastercard, American Express",
        },
        Self {
            id: "sepa_debit",
            name: "SEPA-Lastschrift",
            description: "Europäische Banküberweisung",
        },
    ];
}

#[cfg(test)]
mod spec {
    use super::{Email, IntentId, Status};

    #[test]
    fn validates_emails() {
        assert!(Email::new("kunde@example.ch").is_some());
        assert!(Email::new(" kunde@example.ch ").is_some());
        assert!(Email::new("kunde@example").is_none());
        assert!(Email::new("kunde example@x.ch").is_none());
        assert!(Email::new("@example.ch").is_none());
        assert!(Email::new("").is_none());
    }

    #[test]
    fn rejects_malformed_intent_ids() {
        assert!(IntentId::new("pi_123").is_some());
        assert!(IntentId::new("  ").is_none());
        assert!(IntentId::new("pi_1/../x").is_none());
    }

    #[test]
    fn status_uses_processor_notation() {
        assert_eq!(Status::Succeeded.to_string(), "succeeded");
        assert_eq!(
            Status::RequiresPaymentMethod.to_string(),
            "requires_payment_method",
        );
    }
}
