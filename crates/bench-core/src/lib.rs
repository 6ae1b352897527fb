//! Core types for the table-bench load generator.
//!
//! This crate provides the data model shared by every other crate in the
//! workspace:
//!
//! - [`StorageType`] - A column's type token and its parsed kind
//! - [`ScalarValue`] - One generated cell value
//! - [`ColumnSpec`] / [`ColumnSource`] - A column and where its values come from
//! - [`TableSchema`] - Ordered columns loaded from a JSON or YAML schema file
//!
//! # Architecture
//!
//! ```text
//! bench-core (this crate)
//!    │
//!    ├─── loadtest-generator            (ValueSource over a TableSchema)
//!    ├─── loadtest-populate             (BatchScheduler, BatchInserter)
//!    └─── loadtest-populate-postgresql  (ScalarValue -> PostgreSQL parameters, DDL)
//! ```

pub mod schema;
pub mod types;
pub mod values;

// Re-exports for convenience
pub use schema::{
    validate_identifier, ColumnSource, ColumnSpec, GeneratorConfig, SchemaError, TableSchema,
    PRIMARY_KEY_COLUMN,
};
pub use types::{StorageKind, StorageType, UnsupportedType};
pub use values::{parse_timestamp, Row, ScalarValue};
