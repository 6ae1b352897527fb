//! Static value generator.

use bench_core::ScalarValue;
use serde_json::Value as JsonValue;

/// Convert a configured static value into a scalar.
///
/// Non-scalar values are rejected when the schema is loaded, so they only
/// reach this point through a hand-built schema; they become NULL.
pub fn static_value(value: &JsonValue) -> ScalarValue {
    ScalarValue::from_json(value).unwrap_or(ScalarValue::Null)
}
