//! Group-wise batch scheduler.
//!
//! Batches `1..=total_batches` are split into consecutive groups of at most
//! `concurrency` batches. Each group is dispatched as one task per batch and
//! fully awaited before the next group starts, so at most `concurrency`
//! batches (and connections) are ever in flight.
//!
//! ```text
//! Idle ─► GroupDispatch(1) ─► GroupAwait(1) ─► GroupDispatch(2) ─► ... ─► Done
//! ```

use crate::error::PopulateError;
use crate::inserter::BatchInserter;
use crate::job::{BatchError, BatchJob, BatchOutcome};
use crate::report::{GroupSummary, PopulateReport};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::{Id, JoinError, JoinSet};
use tracing::{debug, info, warn};

/// Default number of batches in flight.
pub const DEFAULT_CONCURRENCY: usize = 6;

/// Default deadline for a single batch.
pub const DEFAULT_BATCH_TIMEOUT: Duration = Duration::from_secs(300);

/// Scheduler tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerOptions {
    /// Maximum batches per group.
    pub concurrency: usize,
    /// Deadline for each batch; `None` waits indefinitely.
    pub batch_timeout: Option<Duration>,
    /// Deadline for the whole run; `None` waits indefinitely.
    pub run_timeout: Option<Duration>,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            batch_timeout: Some(DEFAULT_BATCH_TIMEOUT),
            run_timeout: None,
        }
    }
}

/// Scheduler lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Nothing dispatched yet.
    Idle,
    /// Spawning the batches of a group.
    GroupDispatch { group: usize },
    /// Waiting for every batch of a group.
    GroupAwait { group: usize },
    /// All groups handled.
    Done,
}

/// Split `1..=total_batches` into consecutive groups of at most `concurrency`.
///
/// Produces `ceil(total_batches / concurrency)` groups; only the last one may
/// be short. `concurrency` must be at least 1.
pub fn partition_groups(total_batches: u64, concurrency: usize) -> Vec<Vec<u64>> {
    let size = concurrency.max(1) as u64;
    let mut groups = Vec::with_capacity(total_batches.div_ceil(size) as usize);
    let mut start = 1;
    while start <= total_batches {
        let end = (start + size - 1).min(total_batches);
        groups.push((start..=end).collect());
        start = end + 1;
    }
    groups
}

/// Drives an inserter over every batch of a run.
pub struct BatchScheduler<I> {
    inserter: Arc<I>,
    options: SchedulerOptions,
    state: SchedulerState,
}

impl<I: BatchInserter> BatchScheduler<I> {
    /// Create a scheduler.
    pub fn new(inserter: Arc<I>, options: SchedulerOptions) -> Self {
        Self {
            inserter,
            options,
            state: SchedulerState::Idle,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Scheduler options.
    pub fn options(&self) -> &SchedulerOptions {
        &self.options
    }

    fn transition(&mut self, next: SchedulerState) {
        debug!("Scheduler state: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Run `total_batches` batches of `batch_size` rows into `table_name`.
    ///
    /// Returns an error only for invalid input, before any batch starts.
    /// Batch failures are recorded in the report and never stop the run;
    /// successes plus failures always equal `total_batches`.
    pub async fn populate(
        &mut self,
        batch_size: usize,
        total_batches: u64,
        table_name: &str,
    ) -> Result<PopulateReport, PopulateError> {
        if batch_size == 0 {
            return Err(PopulateError::InvalidBatchSize);
        }
        if self.options.concurrency == 0 {
            return Err(PopulateError::InvalidConcurrency);
        }
        bench_core::validate_identifier(table_name).map_err(|reason| {
            PopulateError::InvalidTableName {
                name: table_name.to_string(),
                reason,
            }
        })?;

        let concurrency = self.options.concurrency;
        let start = Instant::now();
        let deadline = self
            .options
            .run_timeout
            .filter(|limit| !limit.is_zero())
            .map(|limit| tokio::time::Instant::now() + limit);

        let groups = partition_groups(total_batches, concurrency);
        info!(
            "Populating '{}': {} batches of {} rows in {} groups (concurrency {})",
            table_name,
            total_batches,
            batch_size,
            groups.len(),
            concurrency
        );

        self.state = SchedulerState::Idle;
        let mut report = PopulateReport::new(table_name, batch_size, total_batches, concurrency);

        for (index, batch_numbers) in groups.into_iter().enumerate() {
            let group = index + 1;

            // A group that finished after the deadline may not have noticed it.
            if !report.run_deadline_expired
                && deadline.is_some_and(|d| tokio::time::Instant::now() >= d)
            {
                warn!("Run deadline expired before group {} was dispatched", group);
                report.run_deadline_expired = true;
            }

            if report.run_deadline_expired {
                for batch_number in batch_numbers {
                    report.outcomes.push(BatchOutcome::failure(
                        batch_number,
                        BatchError::Timeout("run deadline expired before dispatch".to_string()),
                        Duration::ZERO,
                    ));
                }
                continue;
            }

            self.transition(SchedulerState::GroupDispatch { group });
            info!("Group {}: dispatching batches {:?}", group, batch_numbers);
            let group_start = Instant::now();

            let mut tasks = JoinSet::new();
            let mut task_batches = HashMap::with_capacity(batch_numbers.len());
            for &batch_number in &batch_numbers {
                let job = BatchJob {
                    batch_number,
                    batch_size,
                    table_name: table_name.to_string(),
                };
                let handle = tasks.spawn(run_batch(
                    Arc::clone(&self.inserter),
                    job,
                    self.options.batch_timeout,
                ));
                task_batches.insert(handle.id(), batch_number);
            }

            self.transition(SchedulerState::GroupAwait { group });
            let (outcomes, expired) =
                await_group(&mut tasks, &batch_numbers, &task_batches, deadline).await;

            for outcome in &outcomes {
                match outcome.error() {
                    None => debug!(
                        "Batch {} committed {} rows in {:?}",
                        outcome.batch_number,
                        outcome.rows(),
                        outcome.duration
                    ),
                    Some(e) => warn!("Batch {} failed: {}", outcome.batch_number, e),
                }
            }

            let failed = outcomes.iter().filter(|o| !o.is_success()).count();
            let duration = group_start.elapsed();
            info!(
                "Group {} complete in {:?}: {} succeeded, {} failed",
                group,
                duration,
                outcomes.len() - failed,
                failed
            );

            report.outcomes.extend(outcomes);
            report.groups.push(GroupSummary {
                group_number: group,
                batch_numbers,
                duration,
            });

            if expired {
                warn!("Run deadline expired during group {}", group);
                report.run_deadline_expired = true;
            }
        }

        self.transition(SchedulerState::Done);
        report.finish(start.elapsed());

        info!(
            "Populate complete: {} succeeded, {} failed, {} rows in {:?} ({:.2} rows/sec)",
            report.successes(),
            report.failures(),
            report.rows_inserted(),
            report.total_duration,
            report.rows_per_second()
        );

        Ok(report)
    }
}

/// Run one batch under its own deadline.
///
/// On expiry the inserter's future is dropped, which drops its connection
/// and with it any uncommitted transaction.
async fn run_batch<I: BatchInserter>(
    inserter: Arc<I>,
    job: BatchJob,
    batch_timeout: Option<Duration>,
) -> BatchOutcome {
    let batch_number = job.batch_number;
    let Some(limit) = batch_timeout.filter(|limit| !limit.is_zero()) else {
        return inserter.run(job).await;
    };

    let start = Instant::now();
    match tokio::time::timeout(limit, inserter.run(job)).await {
        Ok(outcome) => outcome,
        Err(_) => BatchOutcome::failure(
            batch_number,
            BatchError::Timeout(format!("batch exceeded its {limit:?} deadline")),
            start.elapsed(),
        ),
    }
}

/// Wait for every task of a group.
///
/// Returns one outcome per batch of the group, and whether the run deadline
/// expired while waiting. Tasks still running at the deadline are aborted
/// and reported as timed out; tasks that panicked are reported as worker
/// failures.
async fn await_group(
    tasks: &mut JoinSet<BatchOutcome>,
    batch_numbers: &[u64],
    task_batches: &HashMap<Id, u64>,
    deadline: Option<tokio::time::Instant>,
) -> (Vec<BatchOutcome>, bool) {
    let mut pending: BTreeSet<u64> = batch_numbers.iter().copied().collect();
    let mut outcomes = Vec::with_capacity(batch_numbers.len());
    let mut panics: BTreeMap<u64, String> = BTreeMap::new();
    let mut expired = false;

    let record_panic = |e: JoinError, panics: &mut BTreeMap<u64, String>| {
        if e.is_panic() {
            if let Some(&batch_number) = task_batches.get(&e.id()) {
                panics.insert(batch_number, e.to_string());
            }
        }
    };

    loop {
        let next = match deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, tasks.join_next()).await {
                Ok(next) => next,
                Err(_) => {
                    expired = true;
                    break;
                }
            },
            None => tasks.join_next().await,
        };
        match next {
            Some(Ok(outcome)) => {
                pending.remove(&outcome.batch_number);
                outcomes.push(outcome);
            }
            Some(Err(e)) => record_panic(e, &mut panics),
            None => break,
        }
    }

    if expired {
        tasks.abort_all();
        // Tasks that finished just before the abort keep their outcome.
        while let Some(result) = tasks.join_next().await {
            match result {
                Ok(outcome) => {
                    pending.remove(&outcome.batch_number);
                    outcomes.push(outcome);
                }
                Err(e) => record_panic(e, &mut panics),
            }
        }
    }

    for batch_number in pending {
        let reason = match panics.remove(&batch_number) {
            Some(message) => BatchError::Worker(message),
            None if expired => BatchError::Timeout(
                "run deadline expired while the batch was in flight".to_string(),
            ),
            None => BatchError::Worker("worker task ended without an outcome".to_string()),
        };
        outcomes.push(BatchOutcome::failure(batch_number, reason, Duration::ZERO));
    }

    (outcomes, expired)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_uneven() {
        let groups = partition_groups(13, 6);
        assert_eq!(
            groups,
            vec![
                vec![1, 2, 3, 4, 5, 6],
                vec![7, 8, 9, 10, 11, 12],
                vec![13]
            ]
        );
    }

    #[test]
    fn test_partition_even_and_small() {
        assert_eq!(partition_groups(12, 6).len(), 2);
        assert_eq!(partition_groups(4, 6), vec![vec![1, 2, 3, 4]]);
        assert_eq!(partition_groups(3, 1), vec![vec![1], vec![2], vec![3]]);
    }

    #[test]
    fn test_partition_empty() {
        assert!(partition_groups(0, 6).is_empty());
    }

    #[test]
    fn test_partition_covers_every_batch_once() {
        for total in 0..40u64 {
            for concurrency in 1..9usize {
                let groups = partition_groups(total, concurrency);
                let expected_groups = total.div_ceil(concurrency as u64) as usize;
                assert_eq!(groups.len(), expected_groups);
                assert!(groups.iter().all(|g| !g.is_empty() && g.len() <= concurrency));

                let flat: Vec<u64> = groups.into_iter().flatten().collect();
                assert_eq!(flat, (1..=total).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn test_default_options() {
        let options = SchedulerOptions::default();
        assert_eq!(options.concurrency, 6);
        assert_eq!(options.batch_timeout, Some(Duration::from_secs(300)));
        assert_eq!(options.run_timeout, None);
    }
}
