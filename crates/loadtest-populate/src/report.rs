//! Populate report types.

use crate::error::PopulateError;
use crate::job::{serialize_millis, BatchError, BatchOutcome};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

/// Summary of one dispatched group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    /// 1-based group number
    pub group_number: usize,
    /// Batch numbers dispatched in this group
    pub batch_numbers: Vec<u64>,
    /// Time from dispatch until every batch of the group finished
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

/// Result of a populate run.
#[derive(Debug, Clone, Serialize)]
pub struct PopulateReport {
    /// Destination table.
    pub table_name: String,
    /// Rows per batch.
    pub batch_size: usize,
    /// Number of batches requested.
    pub total_batches: u64,
    /// Maximum batches in flight.
    pub concurrency: usize,
    /// Groups in dispatch order (groups skipped by the run deadline are absent).
    pub groups: Vec<GroupSummary>,
    /// One outcome per batch, sorted by batch number.
    pub outcomes: Vec<BatchOutcome>,
    /// Wall-clock duration of the run.
    #[serde(rename = "total_duration_ms", serialize_with = "serialize_millis")]
    pub total_duration: Duration,
    /// Whether the run deadline expired.
    pub run_deadline_expired: bool,
}

impl PopulateReport {
    /// Create an empty report for a run.
    pub fn new(table_name: &str, batch_size: usize, total_batches: u64, concurrency: usize) -> Self {
        Self {
            table_name: table_name.to_string(),
            batch_size,
            total_batches,
            concurrency,
            groups: Vec::new(),
            outcomes: Vec::new(),
            total_duration: Duration::ZERO,
            run_deadline_expired: false,
        }
    }

    pub(crate) fn finish(&mut self, total_duration: Duration) {
        self.outcomes.sort_by_key(|o| o.batch_number);
        self.total_duration = total_duration;
    }

    /// Number of successful batches.
    pub fn successes(&self) -> u64 {
        self.outcomes.iter().filter(|o| o.is_success()).count() as u64
    }

    /// Number of failed batches.
    pub fn failures(&self) -> u64 {
        self.outcomes.iter().filter(|o| !o.is_success()).count() as u64
    }

    /// Failed batch numbers with their reasons.
    pub fn failed_batches(&self) -> Vec<(u64, &BatchError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.error().map(|e| (o.batch_number, e)))
            .collect()
    }

    /// Total rows committed.
    pub fn rows_inserted(&self) -> u64 {
        self.outcomes.iter().map(BatchOutcome::rows).sum()
    }

    /// Calculate rows per second.
    pub fn rows_per_second(&self) -> f64 {
        if self.total_duration.as_secs_f64() > 0.0 {
            self.rows_inserted() as f64 / self.total_duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Check if every batch succeeded.
    pub fn is_success(&self) -> bool {
        self.failures() == 0
    }

    /// Generate a summary string.
    pub fn summary(&self) -> String {
        let status = if self.is_success() { "PASSED" } else { "FAILED" };

        let mut summary = format!(
            "Populate Report: {}\n\
             ================\n\
             Table: {}\n\
             Batch Size: {}\n\
             Total Batches: {}\n\
             Concurrency: {}\n\
             Groups: {}\n\n",
            status,
            self.table_name,
            self.batch_size,
            self.total_batches,
            self.concurrency,
            self.groups.len()
        );

        summary.push_str(&format!(
            "Results:\n\
             - Successful Batches: {}\n\
             - Failed Batches: {}\n\
             - Rows Inserted: {}\n\
             - Total Duration: {:?}\n\
             - Throughput: {:.2} rows/sec\n",
            self.successes(),
            self.failures(),
            self.rows_inserted(),
            self.total_duration,
            self.rows_per_second()
        ));

        if self.run_deadline_expired {
            summary.push_str("\nRun deadline expired before all batches completed\n");
        }

        let failed = self.failed_batches();
        if !failed.is_empty() {
            summary.push_str("\nFailures:\n");
            for (batch_number, error) in failed {
                summary.push_str(&format!("- batch {batch_number}: {error}\n"));
            }
        }

        summary
    }

    /// Write the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<(), PopulateError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
