//! Abstract operations.
//!
//! Backends and services implement [`Handler`]s of these wrappers, so the
//! same record type may be inserted, updated, selected or deleted through
//! distinct trait implementations.
//!
//! [`Handler`]: crate::Handler

use std::marker::PhantomData;

/// Operation storing a new value.
#[derive(Clone, Copy, Debug)]
pub struct Insert<T>(pub T);

/// Operation overwriting an existing value.
#[derive(Clone, Copy, Debug)]
pub struct Update<T>(pub T);

/// Operation removing a value.
#[derive(Clone, Copy, Debug)]
pub struct Delete<T>(pub T);

/// Operation reading a value.
#[derive(Clone, Copy, Debug)]
pub struct Select<T>(pub T);

/// Operation handing a value over to its recipient, like an e-mail.
#[derive(Clone, Copy, Debug)]
pub struct Deliver<T>(pub T);

/// Operation launching a long-running job, like a background task loop.
#[derive(Clone, Copy, Debug)]
pub struct Start<T>(pub T);

/// Operation running a single iteration of a job.
#[derive(Clone, Copy, Debug)]
pub struct Perform<T>(pub T);

/// Selector of a `W`hat by a `B`.
///
/// `W` only tags the operation, so `By<Option<Product>, product::Id>` and
/// `By<Vec<Product>, ()>` are different operations for the same backend.
#[derive(Clone, Copy, Debug)]
pub struct By<W, B> {
    /// Type of the selected value.
    _what: PhantomData<W>,

    /// Value to select by.
    by: B,
}

impl<W, B> By<W, B> {
    /// Creates a new [`By`] selector out of the provided value.
    #[must_use]
    pub fn new(by: B) -> Self {
        Self {
            _what: PhantomData,
            by,
        }
    }

    /// Consumes this [`By`] and returns the value to select by.
    #[must_use]
    pub fn into_inner(self) -> B {
        self.by
    }
}
