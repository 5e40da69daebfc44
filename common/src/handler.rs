//! [`Handler`] abstractions.

use std::future::Future;

/// Executable handler.
///
/// Every layer of the backend speaks this single trait: commands and queries
/// of the service, database and storage backends, payment processors and
/// background tasks are all [`Handler`]s of some operation `Args`.
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Executes this [`Handler`] with the provided arguments.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
