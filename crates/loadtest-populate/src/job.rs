//! Batch jobs and their outcomes.

use serde::{Serialize, Serializer};
use std::time::Duration;

/// One unit of work: generate and insert `batch_size` rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    /// 1-based batch number
    pub batch_number: u64,
    /// Number of rows to generate and insert
    pub batch_size: usize,
    /// Destination table
    pub table_name: String,
}

/// Why a batch failed.
///
/// A failure is contained in its batch: it is recorded in the batch's
/// outcome and never aborts sibling batches or the run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum BatchError {
    /// The store was unreachable or rejected the credentials.
    #[error("connection error: {0}")]
    Connection(String),

    /// The value source could not produce a row.
    #[error("generation error: {0}")]
    Generation(String),

    /// The bulk insert or its commit failed.
    #[error("insert error: {0}")]
    Insert(String),

    /// A batch or run deadline expired.
    #[error("timeout: {0}")]
    Timeout(String),

    /// The worker task panicked or was cancelled.
    #[error("worker error: {0}")]
    Worker(String),
}

impl BatchError {
    /// Machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            BatchError::Connection(_) => "connection",
            BatchError::Generation(_) => "generation",
            BatchError::Insert(_) => "insert",
            BatchError::Timeout(_) => "timeout",
            BatchError::Worker(_) => "worker",
        }
    }

    /// Human-readable detail, without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            BatchError::Connection(m)
            | BatchError::Generation(m)
            | BatchError::Insert(m)
            | BatchError::Timeout(m)
            | BatchError::Worker(m) => m,
        }
    }
}

/// Result of one batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// All rows were committed.
    Success {
        /// Rows written by the batch
        rows: u64,
    },
    /// Nothing from the batch was committed.
    Failure(BatchError),
}

/// Outcome reported by an inserter for one batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutcome {
    /// Batch number the outcome belongs to
    pub batch_number: u64,
    /// Success or failure
    pub status: BatchStatus,
    /// Wall-clock time spent on the batch
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

impl BatchOutcome {
    /// A successful outcome.
    pub fn success(batch_number: u64, rows: u64, duration: Duration) -> Self {
        Self {
            batch_number,
            status: BatchStatus::Success { rows },
            duration,
        }
    }

    /// A failed outcome.
    pub fn failure(batch_number: u64, error: BatchError, duration: Duration) -> Self {
        Self {
            batch_number,
            status: BatchStatus::Failure(error),
            duration,
        }
    }

    /// Whether the batch succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self.status, BatchStatus::Success { .. })
    }

    /// Rows committed by the batch (0 on failure).
    pub fn rows(&self) -> u64 {
        match self.status {
            BatchStatus::Success { rows } => rows,
            BatchStatus::Failure(_) => 0,
        }
    }

    /// The failure reason, if any.
    pub fn error(&self) -> Option<&BatchError> {
        match &self.status {
            BatchStatus::Success { .. } => None,
            BatchStatus::Failure(e) => Some(e),
        }
    }
}

pub(crate) fn serialize_millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}
