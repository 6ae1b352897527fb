//! Batch inserters.

use crate::job::{BatchError, BatchJob, BatchOutcome};
use crate::provider::{BatchConnection, ConnectionProvider};
use async_trait::async_trait;
use loadtest_generator::{batch_rng, ValueSource};
use std::time::Instant;
use tracing::debug;

/// Runs one batch to completion and reports its outcome.
///
/// Implementations never return an error: every failure is folded into the
/// returned [`BatchOutcome`].
#[async_trait]
pub trait BatchInserter: Send + Sync + 'static {
    /// Run `job` and report its outcome.
    async fn run(&self, job: BatchJob) -> BatchOutcome;
}

/// Inserter that opens a connection per batch, generates the rows and
/// writes them in one transaction.
pub struct ConnectionBatchInserter<P, S> {
    provider: P,
    source: S,
    seed: u64,
}

impl<P, S> ConnectionBatchInserter<P, S>
where
    P: ConnectionProvider,
    S: ValueSource + 'static,
{
    /// Create an inserter. `seed` is combined with each batch number so
    /// that batches draw independent, reproducible values.
    pub fn new(provider: P, source: S, seed: u64) -> Self {
        Self {
            provider,
            source,
            seed,
        }
    }

    /// The connection provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    async fn write(&self, job: &BatchJob) -> Result<u64, BatchError> {
        let mut connection = self.provider.open().await?;

        let mut rng = batch_rng(self.seed, job.batch_number);
        let rows = self
            .source
            .random_rows(&mut rng, job.batch_size)
            .map_err(|e| BatchError::Generation(e.to_string()))?;

        connection
            .write_batch(&job.table_name, self.source.schema(), &rows)
            .await
    }
}

#[async_trait]
impl<P, S> BatchInserter for ConnectionBatchInserter<P, S>
where
    P: ConnectionProvider,
    S: ValueSource + 'static,
{
    async fn run(&self, job: BatchJob) -> BatchOutcome {
        let start = Instant::now();
        debug!(
            "Batch {}: writing {} rows into '{}'",
            job.batch_number, job.batch_size, job.table_name
        );
        match self.write(&job).await {
            Ok(rows) => BatchOutcome::success(job.batch_number, rows, start.elapsed()),
            Err(e) => BatchOutcome::failure(job.batch_number, e, start.elapsed()),
        }
    }
}
