//! Scalar values produced by value sources and written by inserters.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::fmt;
use uuid::Uuid;

/// A single generated cell value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScalarValue {
    /// SQL NULL
    Null,
    /// Boolean
    Bool(bool),
    /// Integer (narrowed to the column width at insert time)
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Character data; also carries dates and decimals written as text
    Text(String),
    /// Timestamp in UTC
    Timestamp(DateTime<Utc>),
    /// UUID
    Uuid(Uuid),
}

/// One generated row, in schema column order.
pub type Row = Vec<ScalarValue>;

impl ScalarValue {
    /// Convert a JSON (or YAML, via serde) scalar into a value.
    ///
    /// Returns `None` for arrays and objects, which are not scalar.
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::Null => Some(ScalarValue::Null),
            JsonValue::Bool(b) => Some(ScalarValue::Bool(*b)),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(ScalarValue::Int(i))
                } else {
                    n.as_f64().map(ScalarValue::Float)
                }
            }
            JsonValue::String(s) => Some(ScalarValue::Text(s.clone())),
            JsonValue::Array(_) | JsonValue::Object(_) => None,
        }
    }

    /// Short name of the value's variant, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarValue::Null => "null",
            ScalarValue::Bool(_) => "bool",
            ScalarValue::Int(_) => "int",
            ScalarValue::Float(_) => "float",
            ScalarValue::Text(_) => "text",
            ScalarValue::Timestamp(_) => "timestamp",
            ScalarValue::Uuid(_) => "uuid",
        }
    }
}

/// Parse a timestamp written as RFC 3339, `YYYY-MM-DD HH:MM:SS[.f]` or a bare date.
///
/// Values without an offset are taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Null => f.write_str("NULL"),
            ScalarValue::Bool(b) => write!(f, "{b}"),
            ScalarValue::Int(i) => write!(f, "{i}"),
            ScalarValue::Float(v) => write!(f, "{v}"),
            ScalarValue::Text(s) => f.write_str(s),
            ScalarValue::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            ScalarValue::Uuid(u) => write!(f, "{u}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(ScalarValue::from_json(&json!(null)), Some(ScalarValue::Null));
        assert_eq!(ScalarValue::from_json(&json!(true)), Some(ScalarValue::Bool(true)));
        assert_eq!(ScalarValue::from_json(&json!(42)), Some(ScalarValue::Int(42)));
        assert_eq!(ScalarValue::from_json(&json!(2.5)), Some(ScalarValue::Float(2.5)));
        assert_eq!(
            ScalarValue::from_json(&json!("sp")),
            Some(ScalarValue::Text("sp".to_string()))
        );
    }

    #[test]
    fn test_from_json_rejects_collections() {
        assert_eq!(ScalarValue::from_json(&json!([1, 2])), None);
        assert_eq!(ScalarValue::from_json(&json!({"a": 1})), None);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let rfc = parse_timestamp("2024-03-01T12:30:00Z").unwrap();
        let spaced = parse_timestamp("2024-03-01 12:30:00").unwrap();
        assert_eq!(rfc, spaced);

        let date_only = parse_timestamp("2024-03-01").unwrap();
        assert_eq!(date_only.to_rfc3339(), "2024-03-01T00:00:00+00:00");

        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(ScalarValue::Null.to_string(), "NULL");
        assert_eq!(ScalarValue::Int(-3).to_string(), "-3");
        assert_eq!(ScalarValue::Text("abc".into()).to_string(), "abc");
    }
}
