//! [`Mailer`]-related implementations.

#[cfg(feature = "smtp")]
pub mod smtp;

use derive_more::{Display, Error as StdError, From};

#[cfg(feature = "memory")]
use crate::infra::memory;

#[cfg(feature = "smtp")]
pub use self::smtp::Smtp;

/// E-mail delivery operation.
pub use common::Handler as Mailer;

/// [`Mailer`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "smtp")]
    /// [`Smtp`] error.
    Smtp(smtp::Error),

    #[cfg(feature = "memory")]
    /// [`memory::Memory`] error.
    Memory(memory::Error),
}
