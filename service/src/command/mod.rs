//! [`Command`] definition.

pub mod authorize_admin_session;
pub mod confirm_payment;
pub mod create_admin_session;
pub mod create_checkout_session;
pub mod create_payment_intent;
pub mod create_product;
pub mod create_project;
pub mod delete_product;
pub mod delete_project;
pub mod send_contact_message;
pub mod update_product;

use common::operations::Delete;
use derive_more::{AsRef, Display};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::media,
    infra::{storage, Storage},
    Service,
};

/// [`Command`] of the [`Service`].
pub use common::Handler as Command;

pub use self::{
    authorize_admin_session::AuthorizeAdminSession,
    confirm_payment::ConfirmPayment, create_admin_session::CreateAdminSession,
    create_checkout_session::CreateCheckoutSession,
    create_payment_intent::CreatePaymentIntent, create_product::CreateProduct,
    create_project::CreateProject, delete_product::DeleteProduct,
    delete_project::DeleteProject, send_contact_message::SendContactMessage,
    update_product::UpdateProduct,
};

/// Non-fatal problem occurred while executing a [`Command`].
///
/// The [`Command`] still succeeds, but some side effect didn't happen and is
/// left to be reconciled later.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str)]
pub struct Warning(String);

impl<Db, St, Pay, Ml> Service<Db, St, Pay, Ml>
where
    St: Storage<Delete<media::Removal>, Ok = (), Err = Traced<storage::Error>>,
{
    /// Removes the stored files described by the provided [`media::Removal`],
    /// turning a failure into a [`Warning`].
    ///
    /// Files left behind are removed eventually by the
    /// [`task::CleanOrphanedMedia`].
    ///
    /// [`task::CleanOrphanedMedia`]: crate::task::CleanOrphanedMedia
    async fn remove_media(&self, removal: media::Removal) -> Option<Warning> {
        if removal.paths.is_empty() {
            return None;
        }
        let (bucket, count) = (removal.bucket, removal.paths.len());

        let e = self.storage().execute(Delete(removal)).await.err()?;
        log::warn!("failed to remove {count} files from `{bucket}` bucket: {e}");
        Some(Warning(format!(
            "{count} stored file(s) could not be removed and will be cleaned \
             up later",
        )))
    }
}
