//! [`Payments`]-related implementations.

#[cfg(feature = "stripe")]
pub mod stripe;

use derive_more::{Display, Error as StdError, From};

#[cfg(feature = "memory")]
use crate::infra::memory;

#[cfg(feature = "stripe")]
pub use self::stripe::Stripe;

/// Payment processor operation.
pub use common::Handler as Payments;

/// [`Payments`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "stripe")]
    /// [`Stripe`] error.
    Stripe(stripe::Error),

    #[cfg(feature = "memory")]
    /// [`memory::Memory`] error.
    Memory(memory::Error),
}
