//! Conversion of generated values into PostgreSQL bind parameters.
//!
//! The column's storage type decides the Rust type bound for each value, so
//! a candidate written as text in the schema file (a date, a decimal, a
//! UUID) is sent with the column's native wire type.

use crate::error::PostgreSQLPopulatorError;
use bench_core::{parse_timestamp, ScalarValue, StorageKind, StorageType};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;
use tokio_postgres::types::ToSql;
use uuid::Uuid;

/// A boxed bind parameter.
pub type Param = Box<dyn ToSql + Sync + Send>;

/// Convert `value` into a bind parameter for a column of `storage_type`.
pub fn to_param(
    column: &str,
    storage_type: &StorageType,
    value: &ScalarValue,
) -> Result<Param, PostgreSQLPopulatorError> {
    if matches!(value, ScalarValue::Null) {
        return Ok(null_param(storage_type.kind()));
    }

    let mismatch = |reason: &str| PostgreSQLPopulatorError::Conversion {
        column: column.to_string(),
        storage_type: storage_type.token().to_string(),
        value: format!("{} '{}'", value.type_name(), value),
        reason: reason.to_string(),
    };

    let param: Param = match storage_type.kind() {
        StorageKind::Bool => match value {
            ScalarValue::Bool(b) => Box::new(*b),
            ScalarValue::Text(s) => Box::new(parse_bool(s).ok_or_else(|| mismatch("not a boolean"))?),
            _ => return Err(mismatch("not a boolean")),
        },
        StorageKind::Int16 => {
            let v = integer(value).ok_or_else(|| mismatch("not an integer"))?;
            Box::new(i16::try_from(v).map_err(|_| mismatch("out of SMALLINT range"))?)
        }
        StorageKind::Int32 => {
            let v = integer(value).ok_or_else(|| mismatch("not an integer"))?;
            Box::new(i32::try_from(v).map_err(|_| mismatch("out of INTEGER range"))?)
        }
        StorageKind::Int64 => Box::new(integer(value).ok_or_else(|| mismatch("not an integer"))?),
        StorageKind::Float32 => {
            Box::new(float(value).ok_or_else(|| mismatch("not a number"))? as f32)
        }
        StorageKind::Float64 => Box::new(float(value).ok_or_else(|| mismatch("not a number"))?),
        StorageKind::Decimal { scale, .. } => {
            let d = decimal(value).ok_or_else(|| mismatch("not a decimal"))?;
            Box::new(if scale > 0 { d.round_dp(u32::from(scale)) } else { d })
        }
        StorageKind::Char { .. } | StorageKind::VarChar { .. } | StorageKind::Text => {
            Box::new(value.to_string())
        }
        StorageKind::Date => Box::new(date(value).ok_or_else(|| mismatch("not a date"))?),
        StorageKind::Timestamp => {
            Box::new(timestamp(value).ok_or_else(|| mismatch("not a timestamp"))?.naive_utc())
        }
        StorageKind::TimestampTz => {
            Box::new(timestamp(value).ok_or_else(|| mismatch("not a timestamp"))?)
        }
        StorageKind::Uuid => match value {
            ScalarValue::Uuid(u) => Box::new(*u),
            ScalarValue::Text(s) => {
                Box::new(Uuid::parse_str(s.trim()).map_err(|_| mismatch("not a UUID"))?)
            }
            _ => return Err(mismatch("not a UUID")),
        },
    };
    Ok(param)
}

/// A typed NULL, so the server accepts it for the column's type.
fn null_param(kind: StorageKind) -> Param {
    match kind {
        StorageKind::Bool => Box::new(None::<bool>),
        StorageKind::Int16 => Box::new(None::<i16>),
        StorageKind::Int32 => Box::new(None::<i32>),
        StorageKind::Int64 => Box::new(None::<i64>),
        StorageKind::Float32 => Box::new(None::<f32>),
        StorageKind::Float64 => Box::new(None::<f64>),
        StorageKind::Decimal { .. } => Box::new(None::<Decimal>),
        StorageKind::Char { .. } | StorageKind::VarChar { .. } | StorageKind::Text => {
            Box::new(None::<String>)
        }
        StorageKind::Date => Box::new(None::<NaiveDate>),
        StorageKind::Timestamp => Box::new(None::<NaiveDateTime>),
        StorageKind::TimestampTz => Box::new(None::<chrono::DateTime<chrono::Utc>>),
        StorageKind::Uuid => Box::new(None::<Uuid>),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

fn integer(value: &ScalarValue) -> Option<i64> {
    match value {
        ScalarValue::Int(i) => Some(*i),
        ScalarValue::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
        ScalarValue::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn float(value: &ScalarValue) -> Option<f64> {
    match value {
        ScalarValue::Int(i) => Some(*i as f64),
        ScalarValue::Float(f) => Some(*f),
        ScalarValue::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn decimal(value: &ScalarValue) -> Option<Decimal> {
    match value {
        ScalarValue::Int(i) => Some(Decimal::from(*i)),
        ScalarValue::Float(f) => Decimal::from_f64(*f),
        ScalarValue::Text(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

fn date(value: &ScalarValue) -> Option<NaiveDate> {
    match value {
        ScalarValue::Timestamp(ts) => Some(ts.date_naive()),
        ScalarValue::Text(s) => parse_timestamp(s).map(|ts| ts.date_naive()),
        _ => None,
    }
}

fn timestamp(value: &ScalarValue) -> Option<chrono::DateTime<chrono::Utc>> {
    match value {
        ScalarValue::Timestamp(ts) => Some(*ts),
        ScalarValue::Text(s) => parse_timestamp(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(token: &str) -> StorageType {
        StorageType::parse(token).unwrap()
    }

    #[test]
    fn test_integer_narrowing() {
        assert!(to_param("age", &ty("INTEGER"), &ScalarValue::Int(42)).is_ok());
        assert!(to_param("age", &ty("SMALLINT"), &ScalarValue::Int(40_000)).is_err());
        assert!(to_param("age", &ty("INTEGER"), &ScalarValue::Int(i64::MAX)).is_err());
        assert!(to_param("age", &ty("BIGINT"), &ScalarValue::Int(i64::MAX)).is_ok());
        assert!(to_param("age", &ty("INTEGER"), &ScalarValue::Text("17".into())).is_ok());
    }

    #[test]
    fn test_rejects_mismatched_values() {
        let err = to_param("age", &ty("INTEGER"), &ScalarValue::Text("old".into()))
            .err()
            .unwrap();
        let msg = err.to_string();
        assert!(msg.contains("'age'"));
        assert!(msg.contains("INTEGER"));
        assert!(msg.contains("not an integer"));

        assert!(to_param("flag", &ty("BOOLEAN"), &ScalarValue::Int(3)).is_err());
        assert!(to_param("id2", &ty("UUID"), &ScalarValue::Text("nope".into())).is_err());
        assert!(to_param("day", &ty("DATE"), &ScalarValue::Int(1)).is_err());
        assert!(to_param("n", &ty("INTEGER"), &ScalarValue::Float(1.5)).is_err());
    }

    #[test]
    fn test_text_columns_accept_any_scalar() {
        for value in [
            ScalarValue::Int(7),
            ScalarValue::Bool(true),
            ScalarValue::Text("PE".into()),
            ScalarValue::Uuid(Uuid::nil()),
        ] {
            assert!(to_param("c", &ty("VARCHAR(40)"), &value).is_ok());
        }
    }

    #[test]
    fn test_text_is_parsed_for_typed_columns() {
        assert!(to_param("d", &ty("DATE"), &ScalarValue::Text("2024-03-01".into())).is_ok());
        assert!(to_param(
            "t",
            &ty("TIMESTAMP"),
            &ScalarValue::Text("2024-03-01 10:00:00".into())
        )
        .is_ok());
        assert!(to_param("p", &ty("NUMERIC(10,2)"), &ScalarValue::Text("19.999".into())).is_ok());
        assert!(to_param("b", &ty("BOOLEAN"), &ScalarValue::Text("t".into())).is_ok());
        assert!(to_param(
            "u",
            &ty("UUID"),
            &ScalarValue::Text("67e55044-10b1-426f-9247-bb680e5fe0c8".into())
        )
        .is_ok());
    }

    #[test]
    fn test_null_is_typed() {
        let param = to_param("age", &ty("INTEGER"), &ScalarValue::Null).unwrap();
        assert_eq!(format!("{param:?}"), "None");
    }

    #[test]
    fn test_decimal_helpers() {
        assert_eq!(
            decimal(&ScalarValue::Text("12.50".into())),
            Some(Decimal::new(1250, 2))
        );
        assert_eq!(decimal(&ScalarValue::Int(3)), Some(Decimal::from(3)));
        assert_eq!(decimal(&ScalarValue::Bool(true)), None);
    }

    #[test]
    fn test_parse_bool_words() {
        assert_eq!(parse_bool("Yes"), Some(true));
        assert_eq!(parse_bool("f"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
