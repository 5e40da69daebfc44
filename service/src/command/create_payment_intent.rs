//! [`Command`] for creating a new [`PaymentIntent`].

use std::collections::BTreeMap;

use common::{operations::Insert, Money};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        payment::{self, NewPaymentIntent},
        PaymentIntent,
    },
    infra::{payments, Payments},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`PaymentIntent`] the customer completes in
/// their browser.
#[derive(Clone, Debug)]
pub struct CreatePaymentIntent {
    /// [`Money`] amount to collect.
    pub amount: Money,

    /// [`payment::Description`] of the payment.
    pub description: payment::Description,

    /// [`payment::Email`] of the customer.
    pub customer_email: payment::Email,

    /// Arbitrary metadata attached to the payment.
    pub metadata: BTreeMap<String, String>,
}

impl<Db, St, Pay, Ml> Command<CreatePaymentIntent> for Service<Db, St, Pay, Ml>
where
    Pay: Payments<
        Insert<NewPaymentIntent>,
        Ok = PaymentIntent,
        Err = Traced<payments::Error>,
    >,
{
    type Ok = PaymentIntent;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreatePaymentIntent,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreatePaymentIntent {
            amount,
            description,
            customer_email,
            metadata,
        } = cmd;

        if !amount.is_positive() {
            return Err(tracerr::new!(E::InvalidAmount(amount)));
        }

        self.payments()
            .execute(Insert(NewPaymentIntent {
                amount,
                description,
                customer_email,
                metadata,
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`CreatePaymentIntent`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Payments`] error.
    #[display("`Payments` operation failed: {_0}")]
    Payments(payments::Error),

    /// Amount to collect is not positive.
    #[display("Invalid payment amount: {_0}")]
    #[from(ignore)]
    InvalidAmount(#[error(not(source))] Money),
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::{Currency, Money};

    use crate::{
        command::Command as _,
        domain::payment::{self, Status},
        spec::service,
    };

    use super::{CreatePaymentIntent, ExecutionError};

    fn command(amount: &str) -> CreatePaymentIntent {
        CreatePaymentIntent {
            amount: Money::from_str(amount).unwrap(),
            description: payment::Description::new("Gerüst A").unwrap(),
            customer_email: payment::Email::new("kunde@example.ch").unwrap(),
            metadata: [("orderId".to_owned(), "42".to_owned())].into(),
        }
    }

    #[tokio::test]
    async fn creates_intent_in_minor_units() {
        let (svc, _) = service();

        let intent = svc.execute(command("12.50 CHF")).await.unwrap();

        assert_eq!(intent.amount, 1250);
        assert_eq!(intent.currency, Currency::Chf);
        assert_eq!(intent.status, Status::RequiresPaymentMethod);
        assert!(intent.client_secret.is_some());
    }

    #[tokio::test]
    async fn rejects_non_positive_amount() {
        let (svc, _) = service();

        for amount in ["0 CHF", "-5 EUR"] {
            let err = svc.execute(command(amount)).await.unwrap_err();

            assert!(matches!(err.as_ref(), ExecutionError::InvalidAmount(_)));
        }
    }
}
