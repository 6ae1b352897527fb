//! Synthetic row generator for the table-bench load generator.
//!
//! This crate provides the [`ValueSource`] contract and its default
//! implementation, [`CandidateValueSource`], which draws every column of a
//! [`bench_core::TableSchema`] independently: uniformly from the column's
//! candidate values, or from its synthetic generator.
//!
//! # Architecture
//!
//! ```text
//! TableSchema (JSON / YAML)
//!        │
//!        ▼
//! ┌──────────────────────┐
//! │ CandidateValueSource │   immutable, shared by all workers
//! └──────────┬───────────┘
//!            │ random_row(&mut StdRng)   one RNG per batch: batch_rng(seed, n)
//!            ▼
//!    Row = Vec<ScalarValue>  (schema column order)
//! ```
//!
//! # Example
//!
//! ```rust
//! use bench_core::TableSchema;
//! use loadtest_generator::{batch_rng, CandidateValueSource, ValueSource};
//!
//! let schema = TableSchema::from_json(r#"{
//!     "city": { "type": "TEXT", "values": ["Recife", "Natal"] },
//!     "score": { "type": "INTEGER", "generator": { "type": "int_range", "min": 0, "max": 10 } }
//! }"#).unwrap();
//!
//! let source = CandidateValueSource::new(schema);
//! let row = source.random_row(&mut batch_rng(42, 1)).unwrap();
//! assert_eq!(row.len(), 2);
//! ```
//!
//! # Generators
//!
//! - `int_range` - Random integers in a range
//! - `float_range` - Random floats in a range
//! - `weighted_bool` - Boolean with configurable true probability
//! - `timestamp_now` - Current time at generation
//! - `timestamp_range` - Random timestamps in a date range
//! - `uuid_v4` - Random UUID v4
//! - `static` - Static value

pub mod generator;
pub mod generators;

// Re-exports for convenience
pub use generator::{batch_rng, batch_seed, CandidateValueSource, GeneratorError, ValueSource};
