//! Concurrent batched populate engine.
//!
//! This crate turns a row count into a series of independent batches and
//! runs them against a store with bounded concurrency:
//!
//! - [`BatchScheduler`] - Splits the run into groups and awaits each group
//! - [`BatchInserter`] - Runs one batch (connect, generate, write, commit)
//! - [`ConnectionProvider`] / [`BatchConnection`] - The store-specific seam
//! - [`PopulateReport`] - Per-batch outcomes and run totals
//!
//! # Architecture
//!
//! ```text
//! BatchScheduler ──spawns──► BatchInserter::run(BatchJob)
//!                               │
//!                               ├─ ConnectionProvider::open()
//!                               ├─ ValueSource::random_rows()
//!                               └─ BatchConnection::write_batch()  (one transaction)
//! ```

pub mod args;
pub mod duration;
pub mod error;
pub mod inserter;
pub mod job;
pub mod provider;
pub mod report;
pub mod scheduler;

// Re-exports for convenience
pub use args::CommonPopulateArgs;
pub use duration::{parse_duration, DurationParseError};
pub use error::PopulateError;
pub use inserter::{BatchInserter, ConnectionBatchInserter};
pub use job::{BatchError, BatchJob, BatchOutcome, BatchStatus};
pub use provider::{BatchConnection, ConnectionProvider};
pub use report::{GroupSummary, PopulateReport};
pub use scheduler::{
    partition_groups, BatchScheduler, SchedulerOptions, SchedulerState, DEFAULT_BATCH_TIMEOUT,
    DEFAULT_CONCURRENCY,
};
