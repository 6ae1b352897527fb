//! PostgreSQL load testing integration test.
//!
//! 1. Create a uniquely named table from the fixture schema
//! 2. Populate it with 13 batches, 6 at a time
//! 3. Check row count, shown rows and table listing
//! 4. Clear and drop the table

use bench_core::TableSchema;
use loadtest_generator::CandidateValueSource;
use loadtest_populate::{BatchScheduler, ConnectionBatchInserter, SchedulerOptions};
use loadtest_populate_postgresql::{PostgreSQLConnectionProvider, TableAdmin};
use std::sync::Arc;
use std::time::Duration;
use table_bench::config::DbConfig;
use tokio_test::{assert_err, assert_ok};

const SEED: u64 = 42;
const BATCH_SIZE: usize = 20;
const TOTAL_BATCHES: u64 = 13;

fn connection_string() -> Option<String> {
    match std::env::var("POSTGRESQL_CONNECTION_STRING") {
        Ok(s) if !s.trim().is_empty() => Some(s),
        _ => {
            eprintln!("POSTGRESQL_CONNECTION_STRING not set; skipping PostgreSQL load test");
            None
        }
    }
}

fn unique_table_name(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or_default();
    format!("{prefix}_{}_{nanos}", std::process::id())
}

fn provider(conn_str: &str) -> PostgreSQLConnectionProvider {
    PostgreSQLConnectionProvider::from_connection_string(conn_str)
        .expect("Invalid POSTGRESQL_CONNECTION_STRING")
}

#[tokio::test]
async fn test_postgresql_loadtest_small_scale() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for debug output
    tracing_subscriber::fmt()
        .with_env_filter("table_bench=info,loadtest_populate=info")
        .try_init()
        .ok();

    let Some(conn_str) = connection_string() else {
        return Ok(());
    };

    let schema = TableSchema::from_file("tests/fixtures/data.json")?;
    let table_name = unique_table_name("bench_it");
    let admin = TableAdmin::new(provider(&conn_str));

    // === CREATE ===
    admin.create_table(&table_name, &schema).await?;
    // Creating twice is a no-op.
    assert_ok!(admin.create_table(&table_name, &schema).await);
    assert!(admin.list_tables().await?.contains(&table_name));

    // === POPULATE ===
    let inserter = ConnectionBatchInserter::new(
        provider(&conn_str),
        CandidateValueSource::new(schema.clone()),
        SEED,
    );
    let mut scheduler = BatchScheduler::new(Arc::new(inserter), SchedulerOptions::default());
    let report = scheduler
        .populate(BATCH_SIZE, TOTAL_BATCHES, &table_name)
        .await?;

    assert!(report.is_success(), "{}", report.summary());
    assert_eq!(report.successes(), TOTAL_BATCHES);
    assert_eq!(report.groups.len(), 3);
    assert_eq!(report.rows_inserted(), TOTAL_BATCHES * BATCH_SIZE as u64);

    // === INSPECT ===
    assert_eq!(
        admin.count_rows(&table_name).await?,
        TOTAL_BATCHES * BATCH_SIZE as u64
    );

    let rows = admin.show_rows(&table_name, 5).await?;
    assert_eq!(rows.rows.len(), 5);
    assert_eq!(rows.columns.first().map(String::as_str), Some("id"));
    assert_eq!(rows.columns.len(), schema.len() + 1);
    let name_index = rows.columns.iter().position(|c| c == "name").unwrap();
    let names = ["Ana", "Bruno", "Carla", "Davi", "Elisa", "Fabio"];
    for row in &rows.rows {
        let name = row[name_index].as_deref().unwrap();
        assert!(names.contains(&name), "unexpected name {name}");
    }

    // === CLEAR & DROP ===
    assert_eq!(
        admin.clear_table(&table_name).await?,
        TOTAL_BATCHES * BATCH_SIZE as u64
    );
    assert_eq!(admin.count_rows(&table_name).await?, 0);

    admin.drop_table(&table_name).await?;
    assert!(!admin.list_tables().await?.contains(&table_name));
    // Dropping twice is a no-op.
    assert_ok!(admin.drop_table(&table_name).await);

    Ok(())
}

#[tokio::test]
async fn test_missing_table_fails_every_batch() -> Result<(), Box<dyn std::error::Error>> {
    let Some(conn_str) = connection_string() else {
        return Ok(());
    };

    let schema = TableSchema::from_file("tests/fixtures/data.json")?;
    let table_name = unique_table_name("bench_missing");

    let inserter = ConnectionBatchInserter::new(
        provider(&conn_str),
        CandidateValueSource::new(schema),
        SEED,
    );
    let mut scheduler = BatchScheduler::new(Arc::new(inserter), SchedulerOptions::default());
    let report = scheduler.populate(10, 7, &table_name).await?;

    assert_eq!(report.failures(), 7);
    assert!(report
        .failed_batches()
        .iter()
        .all(|(_, e)| e.kind() == "insert"));

    let admin = TableAdmin::new(provider(&conn_str));
    assert_err!(admin.count_rows(&table_name).await);
    Ok(())
}

#[tokio::test]
async fn test_unreachable_server_fails_with_connection_errors() {
    // Port 1 on localhost refuses connections; no server is needed.
    let db_config = DbConfig {
        port: 1,
        ..Default::default()
    };
    let mut pg_config = db_config.to_pg_config();
    pg_config.connect_timeout(Duration::from_secs(2));

    let schema = TableSchema::from_file("tests/fixtures/data.json").unwrap();
    let inserter = ConnectionBatchInserter::new(
        PostgreSQLConnectionProvider::new(pg_config),
        CandidateValueSource::new(schema),
        SEED,
    );
    let mut scheduler = BatchScheduler::new(
        Arc::new(inserter),
        SchedulerOptions {
            concurrency: 3,
            ..Default::default()
        },
    );
    let report = scheduler.populate(10, 4, "never_written").await.unwrap();

    assert_eq!(report.successes(), 0);
    assert_eq!(report.failures(), 4);
    assert!(report
        .failed_batches()
        .iter()
        .all(|(_, e)| e.kind() == "connection"));
}
