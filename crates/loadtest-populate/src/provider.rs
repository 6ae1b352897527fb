//! Connection contracts between the engine and a store.
//!
//! A [`ConnectionProvider`] hands out a fresh, independent connection per
//! call. The connection is owned by exactly one batch and released when
//! it is dropped, so every exit path of a batch (success, failure, timeout
//! or cancellation) gives it back.

use crate::job::BatchError;
use async_trait::async_trait;
use bench_core::{Row, TableSchema};

/// Opens connections to the target store.
#[async_trait]
pub trait ConnectionProvider: Send + Sync + 'static {
    /// Connection type produced by this provider.
    type Connection: BatchConnection;

    /// Open a new connection.
    ///
    /// Unreachable stores and rejected credentials map to
    /// [`BatchError::Connection`].
    async fn open(&self) -> Result<Self::Connection, BatchError>;
}

/// An open connection able to write one batch atomically.
#[async_trait]
pub trait BatchConnection: Send {
    /// Insert `rows` into `table_name` and commit, as one transaction.
    ///
    /// Either every row is committed and the row count is returned, or
    /// nothing is committed and an error is returned.
    async fn write_batch(
        &mut self,
        table_name: &str,
        schema: &TableSchema,
        rows: &[Row],
    ) -> Result<u64, BatchError>;
}
