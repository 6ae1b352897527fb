//! Error types for the PostgreSQL populator.

use thiserror::Error;

/// Errors that can occur during PostgreSQL population and table administration.
#[derive(Error, Debug)]
pub enum PostgreSQLPopulatorError {
    /// PostgreSQL connection or query error.
    #[error("PostgreSQL error: {0}")]
    PostgreSQL(#[from] tokio_postgres::Error),

    /// A table or column name is not a plain identifier.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A generated value does not fit its column's storage type.
    #[error("Cannot store {value} in column '{column}' ({storage_type}): {reason}")]
    Conversion {
        column: String,
        storage_type: String,
        value: String,
        reason: String,
    },

    /// A row does not have one value per schema column.
    #[error("Row has {actual} values but the schema has {expected} columns")]
    RowShape { expected: usize, actual: usize },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
