//! Row generation for a single table.

use crate::generators::generate_column_value;
use bench_core::{Row, TableSchema};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

/// Error type for generator operations.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// A column could not produce a value
    #[error("Column '{0}' has no candidate values")]
    NoCandidates(String),
}

/// Produces synthetic rows for a table schema.
///
/// Implementations hold no mutable state: the caller supplies the RNG, so a
/// single source can be shared by concurrent workers behind an `Arc`.
pub trait ValueSource: Send + Sync {
    /// The schema rows are generated for.
    fn schema(&self) -> &TableSchema;

    /// Generate one row, one value per column in schema order.
    fn random_row(&self, rng: &mut StdRng) -> Result<Row, GeneratorError>;

    /// Generate `count` rows.
    fn random_rows(&self, rng: &mut StdRng, count: usize) -> Result<Vec<Row>, GeneratorError> {
        (0..count).map(|_| self.random_row(rng)).collect()
    }
}

/// Value source that draws each column uniformly from its candidate values,
/// or from its synthetic generator.
#[derive(Debug, Clone)]
pub struct CandidateValueSource {
    schema: Arc<TableSchema>,
}

impl CandidateValueSource {
    /// Create a value source for the given schema.
    pub fn new(schema: impl Into<Arc<TableSchema>>) -> Self {
        Self {
            schema: schema.into(),
        }
    }
}

impl ValueSource for CandidateValueSource {
    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    fn random_row(&self, rng: &mut StdRng) -> Result<Row, GeneratorError> {
        self.schema
            .columns()
            .iter()
            .map(|column| {
                generate_column_value(&column.source, rng)
                    .ok_or_else(|| GeneratorError::NoCandidates(column.name.clone()))
            })
            .collect()
    }
}

/// Compute the RNG seed for a specific batch.
///
/// Each batch gets its own stream so that concurrent batches never share RNG
/// state and the same `(seed, batch_number)` always yields the same rows.
pub fn batch_seed(seed: u64, batch_number: u64) -> u64 {
    seed.wrapping_add(batch_number.wrapping_mul(0x9E3779B97F4A7C15))
}

/// Create the RNG for a specific batch.
pub fn batch_rng(seed: u64, batch_number: u64) -> StdRng {
    StdRng::seed_from_u64(batch_seed(seed, batch_number))
}
