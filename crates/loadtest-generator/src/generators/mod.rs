//! Individual value generators for different data types.
//!
//! This module provides the generation logic for each synthetic generator
//! and for candidate-value columns.

pub mod numeric;
pub mod static_value;
pub mod timestamp;
pub mod uuid;

use bench_core::{ColumnSource, GeneratorConfig, ScalarValue};
use rand::Rng;

/// Generate a value for one column.
///
/// Candidate columns draw uniformly; an empty candidate set (only possible
/// for a schema that bypassed validation) yields `None`.
pub fn generate_column_value<R: Rng + ?Sized>(
    source: &ColumnSource,
    rng: &mut R,
) -> Option<ScalarValue> {
    match source {
        ColumnSource::Candidates(values) => {
            if values.is_empty() {
                None
            } else {
                let idx = rng.gen_range(0..values.len());
                Some(values[idx].clone())
            }
        }
        ColumnSource::Generator(config) => Some(generate_value(config, rng)),
    }
}

/// Generate a value based on the generator configuration.
pub fn generate_value<R: Rng + ?Sized>(config: &GeneratorConfig, rng: &mut R) -> ScalarValue {
    match config {
        GeneratorConfig::IntRange { min, max } => numeric::generate_int_range(rng, *min, *max),

        GeneratorConfig::FloatRange { min, max } => numeric::generate_float_range(rng, *min, *max),

        GeneratorConfig::WeightedBool { true_weight } => {
            ScalarValue::Bool(rng.gen_bool(true_weight.clamp(0.0, 1.0)))
        }

        GeneratorConfig::TimestampNow => timestamp::generate_timestamp_now(),

        GeneratorConfig::TimestampRange { start, end } => {
            timestamp::generate_timestamp_range(rng, start, end)
        }

        GeneratorConfig::UuidV4 => uuid::generate_uuid_v4(rng),

        GeneratorConfig::Static { value } => static_value::static_value(value),
    }
}
