//! Populate command runner.

use anyhow::Context;
use bench_core::{ColumnSource, TableSchema};
use loadtest_generator::CandidateValueSource;
use loadtest_populate::{
    partition_groups, BatchScheduler, CommonPopulateArgs, ConnectionBatchInserter, PopulateReport,
};
use loadtest_populate_postgresql::{to_param, PostgreSQLConnectionProvider};
use std::path::Path;
use std::sync::Arc;

use crate::config::{BenchConfig, PopulatePlan};

/// One-line description of a populate plan.
pub fn describe_plan(plan: &PopulatePlan) -> String {
    let groups = partition_groups(plan.total_batches, plan.options.concurrency).len();
    format!(
        "{} batches of {} rows ({} rows) in {} groups of up to {} (seed={}, batch timeout={:?}, run timeout={:?})",
        plan.total_batches,
        plan.batch_size,
        plan.total_batches.saturating_mul(plan.batch_size as u64),
        groups,
        plan.options.concurrency,
        plan.seed,
        plan.options.batch_timeout,
        plan.options.run_timeout
    )
}

/// Check that every candidate value converts to its column's storage type.
///
/// Returns one message per value that would fail at insert time.
pub fn check_candidates(schema: &TableSchema) -> Vec<String> {
    let mut problems = Vec::new();
    for column in schema.columns() {
        let ColumnSource::Candidates(values) = &column.source else {
            continue;
        };
        for value in values {
            if let Err(e) = to_param(&column.name, &column.storage_type, value) {
                problems.push(e.to_string());
            }
        }
    }
    problems
}

/// Run the populate command.
///
/// Returns `None` in dry-run mode, otherwise the run's report. Batch
/// failures are in the report; only setup problems are errors.
pub async fn run_populate(
    config: &BenchConfig,
    schema_path: &Path,
    connection_string: Option<&str>,
    table_name: &str,
    args: &CommonPopulateArgs,
) -> anyhow::Result<Option<PopulateReport>> {
    let schema = TableSchema::from_file(schema_path)
        .with_context(|| format!("Failed to load schema from {schema_path:?}"))?;
    let plan = config.simulation_config.resolve(args)?;
    let connection = config.connection(connection_string)?;
    bench_core::validate_identifier(table_name)
        .map_err(|reason| anyhow::anyhow!("Invalid table name: {reason}"))?;

    if args.dry_run {
        tracing::info!(
            "[DRY-RUN] Would populate '{}' with {}",
            table_name,
            describe_plan(&plan)
        );
        tracing::info!("[DRY-RUN] Connection: {}", connection.display);
        tracing::info!("[DRY-RUN] Columns: {:?}", schema.column_names());
        let problems = check_candidates(&schema);
        if !problems.is_empty() {
            for problem in &problems {
                tracing::error!("[DRY-RUN] {}", problem);
            }
            anyhow::bail!(
                "{} candidate value(s) in {:?} do not match their column type",
                problems.len(),
                schema_path
            );
        }
        tracing::info!("[DRY-RUN] Schema validated successfully");
        return Ok(None);
    }

    tracing::info!(
        "Populating '{}' on {} with {}",
        table_name,
        connection.display,
        describe_plan(&plan)
    );

    let provider = PostgreSQLConnectionProvider::new(connection.config);
    let inserter = ConnectionBatchInserter::new(provider, CandidateValueSource::new(schema), plan.seed);
    let mut scheduler = BatchScheduler::new(Arc::new(inserter), plan.options.clone());

    let report = scheduler
        .populate(plan.batch_size, plan.total_batches, table_name)
        .await
        .context("Populate run could not start")?;

    println!("{}", report.summary());

    if let Some(path) = &args.report_json {
        report
            .write_json(path)
            .with_context(|| format!("Failed to write report to {path:?}"))?;
        tracing::info!("Report written to {:?}", path);
    }

    Ok(Some(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadtest_populate::SchedulerOptions;

    #[test]
    fn test_describe_plan() {
        let plan = PopulatePlan {
            batch_size: 100,
            total_batches: 13,
            seed: 7,
            options: SchedulerOptions::default(),
        };
        let text = describe_plan(&plan);
        assert!(text.starts_with("13 batches of 100 rows (1300 rows) in 3 groups of up to 6"));
        assert!(text.contains("seed=7"));
    }

    #[test]
    fn test_check_candidates_reports_type_mismatches() {
        let schema = TableSchema::from_json(
            r#"{
                "age": {"type": "INTEGER", "values": [30, "x"]},
                "score": {"type": "SMALLINT", "values": [70000]},
                "name": {"type": "VARCHAR(20)", "values": ["Ana", 5]}
            }"#,
        )
        .unwrap();

        let problems = check_candidates(&schema);
        assert_eq!(problems.len(), 2);
        assert!(problems[0].contains("age"));
        assert!(problems[1].contains("score"));
    }

    #[test]
    fn test_check_candidates_accepts_fixture_schema() {
        let schema = TableSchema::from_file(
            Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/data.json"),
        )
        .unwrap();
        assert!(check_candidates(&schema).is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_rejects_mismatched_candidates() {
        let dir = tempfile::tempdir().unwrap();
        let schema_path = dir.path().join("data.json");
        std::fs::write(&schema_path, r#"{"age": {"type": "INTEGER", "values": ["x"]}}"#).unwrap();

        let args = CommonPopulateArgs {
            batch_size: Some(10),
            total_batches: Some(2),
            dry_run: true,
            ..Default::default()
        };
        let result = run_populate(
            &BenchConfig::default(),
            &schema_path,
            None,
            "simulated_data",
            &args,
        )
        .await;

        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("do not match their column type"));
    }
}
