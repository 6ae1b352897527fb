//! PostgreSQL backend for table-bench.
//!
//! This crate plugs PostgreSQL into the populate engine and provides the
//! table administration commands:
//!
//! - [`PostgreSQLConnectionProvider`] - One `tokio-postgres` connection per batch
//! - [`insert_batch`] - Multi-row INSERT, chunked under the bind-parameter limit
//! - [`TableAdmin`] - create / drop / clear / list / count / show
//!
//! # Example
//!
//! ```ignore
//! use loadtest_generator::CandidateValueSource;
//! use loadtest_populate::{BatchScheduler, ConnectionBatchInserter, SchedulerOptions};
//! use loadtest_populate_postgresql::PostgreSQLConnectionProvider;
//! use std::sync::Arc;
//!
//! let provider = PostgreSQLConnectionProvider::from_connection_string(
//!     "host=localhost user=postgres password=postgres dbname=bench",
//! )?;
//! let inserter = ConnectionBatchInserter::new(provider, CandidateValueSource::new(schema), 42);
//! let mut scheduler = BatchScheduler::new(Arc::new(inserter), SchedulerOptions::default());
//! let report = scheduler.populate(100, 13, "simulated_data").await?;
//! println!("{}", report.summary());
//! ```

mod admin;
mod args;
mod error;
mod insert;
mod params;
mod provider;

pub use admin::{RowSet, TableAdmin};
pub use args::PostgreSQLConnectionArgs;
pub use error::PostgreSQLPopulatorError;
pub use insert::{
    build_insert_sql, generate_create_table, insert_batch, quote_identifier, rows_per_statement,
    MAX_BIND_PARAMETERS,
};
pub use params::to_param;
pub use provider::{PostgreSQLConnection, PostgreSQLConnectionProvider};
