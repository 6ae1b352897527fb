//! Errors that stop a populate run before it starts.

use thiserror::Error;

/// Errors returned by the scheduler and report writer.
///
/// Per-batch failures are never surfaced here; they are recorded in the
/// report.
#[derive(Error, Debug)]
pub enum PopulateError {
    /// `batch_size` was zero.
    #[error("batch size must be at least 1")]
    InvalidBatchSize,

    /// `concurrency` was zero.
    #[error("concurrency must be at least 1")]
    InvalidConcurrency,

    /// The table name is empty or not a plain identifier.
    #[error("invalid table name '{name}': {reason}")]
    InvalidTableName { name: String, reason: String },

    /// Writing the report file failed.
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the report failed.
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}
