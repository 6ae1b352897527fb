//! Column storage types.
//!
//! A [`StorageType`] is parsed from the type token written in the schema file
//! (for example `VARCHAR(50)` or `NUMERIC(10,2)`). The token text is kept as
//! written so that generated DDL matches the schema file exactly, while the
//! parsed kind drives value conversion at insert time.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The kind of a column, independent of how its token was spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    /// BOOLEAN / BOOL
    Bool,
    /// SMALLINT / INT2
    Int16,
    /// INTEGER / INT / INT4
    Int32,
    /// BIGINT / INT8
    Int64,
    /// REAL / FLOAT4
    Float32,
    /// DOUBLE PRECISION / FLOAT8 / FLOAT
    Float64,
    /// NUMERIC(p,s) / DECIMAL(p,s)
    Decimal {
        /// Total number of digits (0 when unspecified)
        precision: u8,
        /// Digits after the decimal point
        scale: u8,
    },
    /// CHAR(n) / CHARACTER(n)
    Char {
        /// Maximum length
        length: u16,
    },
    /// VARCHAR(n) / CHARACTER VARYING(n)
    VarChar {
        /// Maximum length
        length: u16,
    },
    /// TEXT
    Text,
    /// DATE
    Date,
    /// TIMESTAMP / TIMESTAMP WITHOUT TIME ZONE
    Timestamp,
    /// TIMESTAMPTZ / TIMESTAMP WITH TIME ZONE
    TimestampTz,
    /// UUID
    Uuid,
}

/// A column storage type: the parsed kind plus the token it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageType {
    kind: StorageKind,
    token: String,
}

/// Error returned when a type token is not a supported storage type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported storage type '{0}'")]
pub struct UnsupportedType(pub String);

impl StorageType {
    /// Parse a type token such as `INTEGER` or `VARCHAR(255)`.
    ///
    /// Matching is case-insensitive and tolerant of extra whitespace.
    pub fn parse(token: &str) -> Result<Self, UnsupportedType> {
        let trimmed = token.trim();
        let normalized = trimmed
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_uppercase();

        let (base, args) = match normalized.find('(') {
            Some(open) => {
                let close = normalized
                    .rfind(')')
                    .filter(|close| *close > open && *close == normalized.len() - 1)
                    .ok_or_else(|| UnsupportedType(trimmed.to_string()))?;
                let args: Vec<&str> = normalized[open + 1..close].split(',').map(str::trim).collect();
                (normalized[..open].trim(), Some(args))
            }
            None => (normalized.as_str(), None),
        };

        let unsupported = || UnsupportedType(trimmed.to_string());
        let kind = match (base, args.as_deref()) {
            ("BOOLEAN" | "BOOL", None) => StorageKind::Bool,
            ("SMALLINT" | "INT2", None) => StorageKind::Int16,
            ("INTEGER" | "INT" | "INT4", None) => StorageKind::Int32,
            ("BIGINT" | "INT8", None) => StorageKind::Int64,
            ("REAL" | "FLOAT4", None) => StorageKind::Float32,
            ("DOUBLE PRECISION" | "FLOAT8" | "FLOAT", None) => StorageKind::Float64,
            ("NUMERIC" | "DECIMAL", None) => StorageKind::Decimal {
                precision: 0,
                scale: 0,
            },
            ("NUMERIC" | "DECIMAL", Some([precision])) => StorageKind::Decimal {
                precision: precision.parse().map_err(|_| unsupported())?,
                scale: 0,
            },
            ("NUMERIC" | "DECIMAL", Some([precision, scale])) => StorageKind::Decimal {
                precision: precision.parse().map_err(|_| unsupported())?,
                scale: scale.parse().map_err(|_| unsupported())?,
            },
            ("CHAR" | "CHARACTER", None) => StorageKind::Char { length: 1 },
            ("CHAR" | "CHARACTER", Some([length])) => StorageKind::Char {
                length: length.parse().map_err(|_| unsupported())?,
            },
            ("VARCHAR" | "CHARACTER VARYING", None) => StorageKind::Text,
            ("VARCHAR" | "CHARACTER VARYING", Some([length])) => StorageKind::VarChar {
                length: length.parse().map_err(|_| unsupported())?,
            },
            ("TEXT", None) => StorageKind::Text,
            ("DATE", None) => StorageKind::Date,
            ("TIMESTAMP" | "TIMESTAMP WITHOUT TIME ZONE", None) => StorageKind::Timestamp,
            ("TIMESTAMPTZ" | "TIMESTAMP WITH TIME ZONE", None) => StorageKind::TimestampTz,
            ("UUID", None) => StorageKind::Uuid,
            _ => return Err(unsupported()),
        };

        Ok(Self {
            kind,
            token: trimmed.to_string(),
        })
    }

    /// The parsed kind.
    pub fn kind(&self) -> StorageKind {
        self.kind
    }

    /// The type token as written in the schema file.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Whether values of this type are stored as character data.
    pub fn is_textual(&self) -> bool {
        matches!(
            self.kind,
            StorageKind::Text | StorageKind::Char { .. } | StorageKind::VarChar { .. }
        )
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token)
    }
}

impl std::str::FromStr for StorageType {
    type Err = UnsupportedType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for StorageType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.token)
    }
}

impl<'de> Deserialize<'de> for StorageType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Self::parse(&token).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_types() {
        assert_eq!(StorageType::parse("INTEGER").unwrap().kind(), StorageKind::Int32);
        assert_eq!(StorageType::parse("int").unwrap().kind(), StorageKind::Int32);
        assert_eq!(StorageType::parse("bigint").unwrap().kind(), StorageKind::Int64);
        assert_eq!(StorageType::parse("Boolean").unwrap().kind(), StorageKind::Bool);
        assert_eq!(StorageType::parse("text").unwrap().kind(), StorageKind::Text);
        assert_eq!(StorageType::parse("uuid").unwrap().kind(), StorageKind::Uuid);
    }

    #[test]
    fn test_parse_multi_word_types() {
        assert_eq!(
            StorageType::parse("double   precision").unwrap().kind(),
            StorageKind::Float64
        );
        assert_eq!(
            StorageType::parse("timestamp with time zone").unwrap().kind(),
            StorageKind::TimestampTz
        );
    }

    #[test]
    fn test_parse_parameterized_types() {
        assert_eq!(
            StorageType::parse("VARCHAR(50)").unwrap().kind(),
            StorageKind::VarChar { length: 50 }
        );
        assert_eq!(
            StorageType::parse("numeric(10, 2)").unwrap().kind(),
            StorageKind::Decimal {
                precision: 10,
                scale: 2
            }
        );
        assert_eq!(
            StorageType::parse("CHAR(3)").unwrap().kind(),
            StorageKind::Char { length: 3 }
        );
    }

    #[test]
    fn test_token_is_preserved() {
        let ty = StorageType::parse("  varchar(20) ").unwrap();
        assert_eq!(ty.token(), "varchar(20)");
        assert_eq!(ty.to_string(), "varchar(20)");
        assert!(ty.is_textual());
    }

    #[test]
    fn test_parse_rejects_unknown_tokens() {
        assert!(StorageType::parse("GEOGRAPHY").is_err());
        assert!(StorageType::parse("VARCHAR(abc)").is_err());
        assert!(StorageType::parse("INTEGER(4)").is_err());
        assert!(StorageType::parse("VARCHAR(10").is_err());
        assert!(StorageType::parse("").is_err());
    }
}
