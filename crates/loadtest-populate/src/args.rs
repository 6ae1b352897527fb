//! Common CLI argument definitions for populate runs.

use crate::duration::parse_duration;
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

/// Populate arguments.
///
/// Every value is optional: anything left unset falls back to the
/// `simulation_config` section of the configuration file.
#[derive(Args, Clone, Debug, Default)]
pub struct CommonPopulateArgs {
    /// Number of rows generated and inserted per batch
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Number of batches to run
    #[arg(long)]
    pub total_batches: Option<u64>,

    /// Maximum number of batches in flight (group size)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Random seed for deterministic generation (same seed = same data)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Deadline for a single batch (e.g. 300, 30s, 5m); 0 disables it
    #[arg(long, value_parser = parse_duration)]
    pub batch_timeout: Option<Duration>,

    /// Deadline for the whole run (e.g. 10m, 1h); 0 disables it
    #[arg(long, value_parser = parse_duration)]
    pub run_timeout: Option<Duration>,

    /// Write the populate report as JSON to this path
    #[arg(long)]
    pub report_json: Option<PathBuf>,

    /// Dry-run mode: validate schema and configuration and print the batch plan without touching the database
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        populate: CommonPopulateArgs,
    }

    #[test]
    fn test_parse_populate_args() {
        let cli = TestCli::parse_from([
            "test",
            "--batch-size",
            "100",
            "--total-batches",
            "13",
            "--batch-timeout",
            "30s",
            "--dry-run",
        ]);
        assert_eq!(cli.populate.batch_size, Some(100));
        assert_eq!(cli.populate.total_batches, Some(13));
        assert_eq!(cli.populate.concurrency, None);
        assert_eq!(cli.populate.batch_timeout, Some(Duration::from_secs(30)));
        assert!(cli.populate.dry_run);
    }

    #[test]
    fn test_rejects_bad_duration() {
        let result = TestCli::try_parse_from(["test", "--run-timeout", "soon"]);
        assert!(result.is_err());
    }
}
