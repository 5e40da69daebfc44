//! Infrastructure layer.

pub mod database;
pub mod mailer;
#[cfg(feature = "memory")]
pub mod memory;
pub mod payments;
pub mod storage;

#[cfg(feature = "memory")]
pub use self::memory::Memory;
pub use self::{
    database::Database, mailer::Mailer, payments::Payments, storage::Storage,
};
#[cfg(feature = "postgres")]
pub use self::database::{postgres, Postgres};
#[cfg(feature = "smtp")]
pub use self::mailer::{smtp, Smtp};
#[cfg(feature = "stripe")]
pub use self::payments::{stripe, Stripe};
#[cfg(feature = "supabase")]
pub use self::storage::{supabase, Supabase};
