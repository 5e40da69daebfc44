//! Postgres [`Database`] implementation.

pub mod connection;
mod impls;

use std::{future::Future, time};

use deadpool_postgres::Runtime;
use derive_more::{Display, Error as StdError, From};
use tokio_postgres::NoTls;
use tracerr::Traced;

use crate::infra::database;
#[cfg(doc)]
use crate::infra::Database;

pub use refinery::embed_migrations;

pub use self::connection::Connection;

pub use deadpool_postgres::Config;

/// Postgres [`Database`] client.
#[derive(Clone, Debug)]
pub struct Postgres {
    /// [`connection::Pool`] every operation takes its connection from.
    pool: connection::Pool,

    /// Maximum [`time::Duration`] a single operation may take, including
    /// waiting for a free connection.
    timeout: time::Duration,
}

impl Postgres {
    /// Creates a new [`Postgres`] client with the provided [`Config`].
    ///
    /// # Errors
    ///
    /// If failed to create a new [`Postgres`] client.
    pub fn new(
        conf: &Config,
        timeout: time::Duration,
    ) -> Result<Self, Traced<database::Error>> {
        let pool = conf
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        Ok(Self { pool, timeout })
    }

    /// Takes a [`connection::Client`] from the [`connection::Pool`].
    async fn client(
        &self,
    ) -> Result<connection::Client, Traced<database::Error>> {
        self.pool
            .get()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }

    /// Runs the provided operation, failing it with [`Error::Timeout`] once
    /// the configured timeout elapses.
    async fn timed<T>(
        &self,
        operation: impl Future<Output = Result<T, Traced<database::Error>>>,
    ) -> Result<T, Traced<database::Error>> {
        tokio::time::timeout(self.timeout, operation)
            .await
            .map_err(|_| tracerr::new!(Error::Timeout(self.timeout)))
            .map_err(tracerr::map_from)?
    }
}

/// Postgres database [`Error`].
#[derive(Debug, Display, StdError, From)]
pub enum Error {
    /// [`Connection`] error.
    #[display("`Connection` error: {_0}")]
    Connection(connection::Error),

    /// Error of creating a new [`connection::Pool`] client.
    #[display("Failed to create a new `connection::Pool`: {_0}")]
    PoolCreationError(connection::PoolCreationError),

    /// [`connection::Pool`] error.
    #[display("`connection::Pool` error: {_0}")]
    PoolError(connection::PoolError),

    /// Operation didn't complete in time.
    #[display("Operation timed out after {_0:?}")]
    #[from(ignore)]
    Timeout(#[error(not(source))] time::Duration),
}
