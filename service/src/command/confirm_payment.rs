//! [`Command`] for confirming a completed payment.

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{payment, PaymentIntent},
    infra::{payments, Payments},
    Service,
};

use super::Command;

/// [`Command`] for checking that the [`PaymentIntent`] with the provided ID
/// has succeeded.
#[derive(Clone, Debug, From)]
pub struct ConfirmPayment {
    /// ID of the [`PaymentIntent`] to confirm.
    pub id: payment::IntentId,
}

impl<Db, St, Pay, Ml> Command<ConfirmPayment> for Service<Db, St, Pay, Ml>
where
    Pay: Payments<
        Select<By<Option<PaymentIntent>, payment::IntentId>>,
        Ok = Option<PaymentIntent>,
        Err = Traced<payments::Error>,
    >,
{
    /// Succeeded [`PaymentIntent`].
    type Ok = PaymentIntent;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: ConfirmPayment) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ConfirmPayment { id } = cmd;

        let intent = self
            .payments()
            .execute(Select(By::new(id.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::NotFound(id))
            .map_err(tracerr::wrap!())?;

        match intent.status {
            payment::Status::Succeeded => Ok(intent),
            status @ (payment::Status::RequiresPaymentMethod
            | payment::Status::RequiresConfirmation
            | payment::Status::RequiresAction
            | payment::Status::Processing
            | payment::Status::RequiresCapture
            | payment::Status::Canceled) => {
                Err(tracerr::new!(E::NotCompleted(status)))
            }
        }
    }
}

/// Error of [`ConfirmPayment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Payments`] error.
    #[display("`Payments` operation failed: {_0}")]
    Payments(payments::Error),

    /// [`PaymentIntent`] with the provided ID doesn't exist.
    #[display("`PaymentIntent(id: {_0})` doesn't exist")]
    #[from(ignore)]
    NotFound(#[error(not(source))] payment::IntentId),

    /// [`PaymentIntent`] hasn't succeeded yet.
    #[display("Payment is not completed: {_0}")]
    #[from(ignore)]
    NotCompleted(#[error(not(source))] payment::Status),
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::Money;

    use crate::{
        command::{Command as _, CreatePaymentIntent},
        domain::payment,
        spec::service,
    };

    use super::{ConfirmPayment, ExecutionError};

    #[tokio::test]
    async fn confirms_only_succeeded_intents() {
        let (svc, memory) = service();
        let intent = svc
            .execute(CreatePaymentIntent {
                amount: Money::from_str("99 CHF").unwrap(),
                description: payment::Description::new("Gerüst A").unwrap(),
                customer_email: payment::Email::new("kunde@example.ch")
                    .unwrap(),
                metadata: [].into(),
            })
            .await
            .unwrap();

        let err = svc
            .execute(ConfirmPayment {
                id: intent.id.clone(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::NotCompleted(
                payment::Status::RequiresPaymentMethod
            ),
        ));

        memory
            .set_intent_status(&intent.id, payment::Status::Succeeded)
            .await;
        let confirmed = svc
            .execute(ConfirmPayment {
                id: intent.id.clone(),
            })
            .await
            .unwrap();
        assert_eq!(confirmed.amount, 9900);
    }

    #[tokio::test]
    async fn fails_on_unknown_intent() {
        let (svc, _) = service();

        let err = svc
            .execute(ConfirmPayment {
                id: payment::IntentId::new("pi_unknown").unwrap(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NotFound(_)));
    }
}
