//! [`Storage`]-related implementations.

#[cfg(feature = "supabase")]
pub mod supabase;

use derive_more::{Display, Error as StdError, From};

#[cfg(feature = "memory")]
use crate::infra::memory;

#[cfg(feature = "supabase")]
pub use self::supabase::Supabase;

/// Object storage operation.
pub use common::Handler as Storage;

/// [`Storage`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "supabase")]
    /// [`Supabase`] error.
    Supabase(supabase::Error),

    #[cfg(feature = "memory")]
    /// [`memory::Memory`] error.
    Memory(memory::Error),
}
