//! [`Command`] for creating a new hosted [`CheckoutSession`].

use common::operations::Insert;
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        payment::{self, LineItem, NewCheckoutSession},
        CheckoutSession,
    },
    infra::{payments, Payments},
    Service,
};

use super::Command;

/// Configuration of [`CreateCheckoutSession`].
#[derive(Clone, Debug)]
pub struct Config {
    /// URL the customer is redirected to after a successful payment, unless
    /// the [`CreateCheckoutSession`] provides its own.
    pub success_url: String,

    /// URL the customer is redirected to after cancelling the payment, unless
    /// the [`CreateCheckoutSession`] provides its own.
    pub cancel_url: String,
}

/// [`Command`] for creating a new hosted [`CheckoutSession`].
#[derive(Clone, Debug)]
pub struct CreateCheckoutSession {
    /// [`LineItem`]s to pay for.
    pub items: Vec<LineItem>,

    /// [`payment::Email`] of the customer, if known.
    pub customer_email: Option<payment::Email>,

    /// URL to redirect to after a successful payment.
    pub success_url: Option<String>,

    /// URL to redirect to after cancelling the payment.
    pub cancel_url: Option<String>,
}

impl<Db, St, Pay, Ml> Command<CreateCheckoutSession>
    for Service<Db, St, Pay, Ml>
where
    Pay: Payments<
        Insert<NewCheckoutSession>,
        Ok = CheckoutSession,
        Err = Traced<payments::Error>,
    >,
{
    type Ok = CheckoutSession;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateCheckoutSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateCheckoutSession {
            items,
            customer_email,
            success_url,
            cancel_url,
        } = cmd;

        if items.is_empty() {
            return Err(tracerr::new!(E::NoItems));
        }
        if let Some(item) = items
            .iter()
            .find(|i| !i.unit_price.is_positive() || i.quantity == 0)
        {
            return Err(tracerr::new!(E::InvalidItem(item.name.to_string())));
        }

        let Config {
            success_url: default_success_url,
            cancel_url: default_cancel_url,
        } = &self.config().checkout;
        self.payments()
            .execute(Insert(NewCheckoutSession {
                items,
                customer_email,
                success_url: success_url
                    .unwrap_or_else(|| default_success_url.clone()),
                cancel_url: cancel_url
                    .unwrap_or_else(|| default_cancel_url.clone()),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`CreateCheckoutSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Payments`] error.
    #[display("`Payments` operation failed: {_0}")]
    Payments(payments::Error),

    /// No [`LineItem`]s provided.
    #[display("No items to pay for")]
    NoItems,

    /// [`LineItem`] with a non-positive price or zero quantity.
    #[display("Item `{_0}` has invalid price or quantity")]
    #[from(ignore)]
    InvalidItem(#[error(not(source))] String),
}
