//! [Stripe] implementation of [`Payments`].
//!
//! [Stripe]: https://docs.stripe.com/api

use std::{str::FromStr as _, time};

use common::{
    operations::{By, Insert, Select},
    Currency,
};
use derive_more::{Debug, Display, Error as StdError, From};
use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;
use tracerr::Traced;

use crate::{
    domain::payment::{
        self, CheckoutSession, NewCheckoutSession, NewPaymentIntent,
        PaymentIntent,
    },
    infra::{payments, Payments},
};

/// [`Stripe`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the Stripe API.
    pub url: String,

    /// Secret API key.
    pub secret_key: SecretString,

    /// Timeout of a single request.
    pub timeout: time::Duration,
}

/// [Stripe] API client.
///
/// [Stripe]: https://docs.stripe.com/api
#[derive(Clone, Debug)]
pub struct Stripe {
    /// HTTP client performing the requests.
    client: reqwest::Client,

    /// Base URL of the Stripe API without a trailing slash.
    url: String,

    /// Secret API key authorizing the requests.
    #[debug(skip)]
    secret_key: SecretString,
}

/// Form parameters of a Stripe API request.
type Form = Vec<(String, String)>;

impl Stripe {
    /// Creates a new [`Stripe`] client with the provided [`Config`].
    ///
    /// # Errors
    ///
    /// If failed to build the underlying HTTP client.
    pub fn new(conf: Config) -> Result<Self, Traced<payments::Error>> {
        let Config {
            url,
            secret_key,
            timeout,
        } = conf;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        Ok(Self {
            client,
            url: url.trim_end_matches('/').to_owned(),
            secret_key,
        })
    }

    /// Starts an authorized request to the provided API `endpoint`.
    fn request(
        &self,
        method: reqwest::Method,
        endpoint: &str,
    ) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}/v1/{endpoint}", self.url))
            .bearer_auth(self.secret_key.expose_secret())
    }

    /// Sends the provided request, ensures it succeeded and decodes its JSON
    /// response.
    ///
    /// [`None`] is returned if the requested object doesn't exist.
    async fn send<T>(
        request: reqwest::RequestBuilder,
    ) -> Result<Option<T>, Traced<payments::Error>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = request
            .send()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_owned());
            return Err(tracerr::map_from(tracerr::new!(Error::Api {
                status: status.as_u16(),
                body,
            })));
        }

        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }

    /// Sends the provided request expecting the created object in response.
    async fn create<T>(
        request: reqwest::RequestBuilder,
    ) -> Result<T, Traced<payments::Error>>
    where
        T: for<'de> Deserialize<'de>,
    {
        Self::send(request)
            .await
            .map_err(tracerr::wrap!())?
            .ok_or_else(|| {
                tracerr::map_from(tracerr::new!(Error::Api {
                    status: reqwest::StatusCode::NOT_FOUND.as_u16(),
                    body: String::new(),
                }))
            })
    }
}

/// Converts the provided [`common::Money`] into minor units accepted by
/// Stripe.
fn minor_units(
    money: &common::Money,
) -> Result<String, Traced<payments::Error>> {
    money
        .minor_units()
        .map(|units| units.to_string())
        .ok_or_else(|| tracerr::new!(Error::AmountOverflow(money.to_string())))
        .map_err(tracerr::map_from)
}

/// [Payment Intent] object of the Stripe API.
///
/// [Payment Intent]: https://docs.stripe.com/api/payment_intents/object
#[derive(Debug, Deserialize)]
struct StripePaymentIntent {
    /// ID of the intent.
    id: String,

    /// Client secret of the intent.
    client_secret: Option<String>,

    /// Amount in minor units.
    amount: i64,

    /// Lowercase [ISO 4217] currency code.
    ///
    /// [ISO 4217]: https://en.wikipedia.org/wiki/ISO_4217
    currency: String,

    /// Status of the intent.
    status: payment::Status,
}

impl TryFrom<StripePaymentIntent> for PaymentIntent {
    type Error = Traced<payments::Error>;

    fn try_from(intent: StripePaymentIntent) -> Result<Self, Self::Error> {
        let StripePaymentIntent {
            id,
            client_secret,
            amount,
            currency,
            status,
        } = intent;

        Ok(Self {
            id: payment::IntentId::new(&id)
                .ok_or_else(|| tracerr::new!(Error::MalformedId(id)))
                .map_err(tracerr::map_from)?,
            client_secret: client_secret.map(Into::into),
            amount,
            currency: Currency::from_str(&currency)
                .map_err(|_| tracerr::new!(Error::UnknownCurrency(currency)))
                .map_err(tracerr::map_from)?,
            status,
        })
    }
}

impl Payments<Insert<NewPaymentIntent>> for Stripe {
    type Ok = PaymentIntent;
    type Err = Traced<payments::Error>;

    async fn execute(
        &self,
        Insert(intent): Insert<NewPaymentIntent>,
    ) -> Result<Self::Ok, Self::Err> {
        let NewPaymentIntent {
            amount,
            description,
            customer_email,
            metadata,
        } = intent;

        let mut form: Form = vec![
            ("amount".into(), minor_units(&amount)?),
            ("currency".into(), amount.currency.to_string()),
            ("description".into(), description.to_string()),
            ("receipt_email".into(), customer_email.to_string()),
            ("automatic_payment_methods[enabled]".into(), "true".into()),
            ("metadata[customer_email]".into(), customer_email.to_string()),
        ];
        form.extend(
            metadata
                .into_iter()
                .filter(|(k, _)| k != "customer_email")
                .map(|(k, v)| (format!("metadata[{k}]"), v)),
        );

        let intent = Self::create::<StripePaymentIntent>(
            self.request(reqwest::Method::POST, "payment_intents").form(&form),
        )
        .await
        .map_err(tracerr::wrap!())?;
        PaymentIntent::try_from(intent).map_err(tracerr::wrap!())
    }
}

impl Payments<Select<By<Option<PaymentIntent>, payment::IntentId>>>
    for Stripe
{
    type Ok = Option<PaymentIntent>;
    type Err = Traced<payments::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<PaymentIntent>, payment::IntentId>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        Self::send::<StripePaymentIntent>(
            self.request(
                reqwest::Method::GET,
                &format!("payment_intents/{id}"),
            ),
        )
        .await
        .map_err(tracerr::wrap!())?
        .map(PaymentIntent::try_from)
        .transpose()
        .map_err(tracerr::wrap!())
    }
}

/// [Checkout Session] object of the Stripe API.
///
/// [Checkout Session]: https://docs.stripe.com/api/checkout/sessions/object
#[derive(Debug, Deserialize)]
struct StripeCheckoutSession {
    /// ID of the session.
    id: String,

    /// URL of the hosted checkout page.
    url: Option<String>,
}

impl Payments<Insert<NewCheckoutSession>> for Stripe {
    type Ok = CheckoutSession;
    type Err = Traced<payments::Error>;

    async fn execute(
        &self,
        Insert(session): Insert<NewCheckoutSession>,
    ) -> Result<Self::Ok, Self::Err> {
        let NewCheckoutSession {
            items,
            customer_email,
            success_url,
            cancel_url,
        } = session;

        let mut form: Form = vec![
            ("mode".into(), "payment".into()),
            ("payment_method_types[0]".into(), "card".into()),
            ("success_url".into(), success_url),
            ("cancel_url".into(), cancel_url),
        ];
        if let Some(email) = &customer_email {
            form.push(("customer_email".into(), email.to_string()));
            form.push(("metadata[customer_email]".into(), email.to_string()));
        }
        for (i, item) in items.iter().enumerate() {
            let prefix = format!("line_items[{i}]");
            form.push((
                format!("{prefix}[price_data][currency]"),
                item.unit_price.currency.to_string(),
            ));
            form.push((
                format!("{prefix}[price_data][product_data][name]"),
                item.name.to_string(),
            ));
            if let Some(description) = &item.description {
                form.push((
                    format!("{prefix}[price_data][product_data][description]"),
                    description.clone(),
                ));
            }
            for (j, image) in item.images.iter().enumerate() {
                form.push((
                    format!("{prefix}[price_data][product_data][images][{j}]"),
                    image.clone(),
                ));
            }
            form.push((
                format!("{prefix}[price_data][unit_amount]"),
                minor_units(&item.unit_price)?,
            ));
            form.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
        }

        let StripeCheckoutSession { id, url } =
            Self::create::<StripeCheckoutSession>(
                self.request(reqwest::Method::POST, "checkout/sessions")
                    .form(&form),
            )
            .await
            .map_err(tracerr::wrap!())?;
        Ok(CheckoutSession { id, url })
    }
}

/// [`Stripe`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// HTTP request failed.
    #[display("HTTP request failed: {_0}")]
    Request(reqwest::Error),

    /// Stripe API responded with a non-success status.
    #[display("Stripe API error ({status}): {body}")]
    #[from(ignore)]
    Api {
        /// HTTP status code of the response.
        status: u16,

        /// Raw body of the response.
        body: String,
    },

    /// Amount doesn't fit into minor units.
    #[display("Amount `{_0}` is out of range")]
    #[from(ignore)]
    AmountOverflow(#[error(not(source))] String),

    /// Stripe responded with a currency not supported by the storefront.
    #[display("Unsupported currency `{_0}`")]
    #[from(ignore)]
    UnknownCurrency(#[error(not(source))] String),

    /// Stripe responded with a malformed object ID.
    #[display("Malformed object ID `{_0}`")]
    #[from(ignore)]
    MalformedId(#[error(not(source))] String),
}
