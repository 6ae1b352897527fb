//! Numeric value generators.

use bench_core::ScalarValue;
use rand::Rng;

/// Generate a random integer in the given range (inclusive).
pub fn generate_int_range<R: Rng + ?Sized>(rng: &mut R, min: i64, max: i64) -> ScalarValue {
    ScalarValue::Int(rng.gen_range(min..=max))
}

/// Generate a random float in the given range (inclusive).
pub fn generate_float_range<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> ScalarValue {
    ScalarValue::Float(rng.gen_range(min..=max))
}
