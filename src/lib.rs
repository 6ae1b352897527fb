//! table-bench library
//!
//! Configuration loading and command handlers behind the `table-bench`
//! binary. The engine itself lives in the workspace crates:
//!
//! - `bench-core` - Column schema and value types
//! - `loadtest-generator` - Random rows drawn from candidate values
//! - `loadtest-populate` - Batch scheduler and inserter contracts
//! - `loadtest-populate-postgresql` - PostgreSQL connections, inserts and DDL
//!
//! # CLI Usage
//!
//! ```bash
//! # Create the table described by data.json
//! table-bench create-table simulated_data
//!
//! # Insert 13 batches of 100 rows, 6 batches at a time
//! table-bench populate simulated_data --batch-size 100 --total-batches 13
//!
//! # Inspect
//! table-bench count-rows simulated_data
//! table-bench show-rows simulated_data --limit 5
//! ```

pub mod config;
pub mod loadtest;

pub use config::BenchConfig;
