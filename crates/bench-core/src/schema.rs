//! Table schema definitions for data generation.
//!
//! A schema file is a map from column name to column definition, in the same
//! shape the original tool's `data.json` used:
//!
//! ```json
//! {
//!   "name":   { "type": "VARCHAR(50)", "values": ["Ana", "Bruno", "Carla"] },
//!   "age":    { "type": "INTEGER", "generator": { "type": "int_range", "min": 18, "max": 90 } },
//!   "active": { "type": "BOOLEAN", "values": [true, false] }
//! }
//! ```
//!
//! Document order is column order. The `id SERIAL PRIMARY KEY` column is
//! implicit and may not be declared.

use crate::types::StorageType;
use crate::values::{parse_timestamp, ScalarValue};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

/// Name of the implicit auto-incrementing primary key column.
pub const PRIMARY_KEY_COLUMN: &str = "id";

// ============================================================================
// Error Types
// ============================================================================

/// Error type for schema operations.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Error reading schema file
    #[error("Failed to read schema file: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Error parsing JSON
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Two columns share a name
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    /// A column uses the reserved primary key name
    #[error("Column '{0}' is reserved for the implicit primary key")]
    ReservedColumn(String),

    /// A column definition is not usable
    #[error("Invalid column '{column}': {reason}")]
    InvalidColumn { column: String, reason: String },

    /// The schema declares no columns
    #[error("Schema has no columns")]
    Empty,
}

/// Longest identifier PostgreSQL keeps without truncation.
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// Check that a table or column name is a plain SQL identifier.
///
/// Accepted names start with a letter or underscore, continue with letters,
/// digits or underscores, and are at most [`MAX_IDENTIFIER_LEN`] bytes.
pub fn validate_identifier(name: &str) -> Result<(), String> {
    let mut chars = name.chars();
    match chars.next() {
        None => return Err("identifier is empty".to_string()),
        Some(c) if !(c.is_ascii_alphabetic() || c == '_') => {
            return Err(format!("identifier '{name}' must start with a letter or '_'"))
        }
        Some(_) => {}
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!(
            "identifier '{name}' may only contain letters, digits and '_'"
        ));
    }
    if name.len() > MAX_IDENTIFIER_LEN {
        return Err(format!(
            "identifier '{name}' is longer than {MAX_IDENTIFIER_LEN} bytes"
        ));
    }
    Ok(())
}

// ============================================================================
// Generator Configuration
// ============================================================================

/// Synthetic value generator for a column without candidate values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeneratorConfig {
    /// Random integers in a range
    IntRange {
        /// Minimum value (inclusive)
        min: i64,
        /// Maximum value (inclusive)
        max: i64,
    },

    /// Random floats in a range
    FloatRange {
        /// Minimum value (inclusive)
        min: f64,
        /// Maximum value (inclusive)
        max: f64,
    },

    /// Boolean with configurable probability of `true`
    WeightedBool {
        /// Weight for true value (0.0 to 1.0)
        true_weight: f64,
    },

    /// Current timestamp at generation time.
    ///
    /// Not deterministic: each row gets the wall-clock time it was generated at.
    TimestampNow,

    /// Random timestamps in a range
    TimestampRange {
        /// Start timestamp (ISO 8601 or `YYYY-MM-DD`)
        start: String,
        /// End timestamp (ISO 8601 or `YYYY-MM-DD`)
        end: String,
    },

    /// Random UUIDs (v4 layout, drawn from the batch RNG)
    UuidV4,

    /// The same value for every row
    Static {
        /// The value to use
        value: JsonValue,
    },
}

impl GeneratorConfig {
    fn validate(&self) -> Result<(), String> {
        match self {
            GeneratorConfig::IntRange { min, max } if min > max => {
                Err(format!("int_range min {min} is greater than max {max}"))
            }
            GeneratorConfig::FloatRange { min, max } => {
                if !min.is_finite() || !max.is_finite() {
                    Err("float_range bounds must be finite".to_string())
                } else if min > max {
                    Err(format!("float_range min {min} is greater than max {max}"))
                } else {
                    Ok(())
                }
            }
            GeneratorConfig::WeightedBool { true_weight }
                if !(0.0..=1.0).contains(true_weight) =>
            {
                Err(format!("weighted_bool true_weight {true_weight} is outside 0..=1"))
            }
            GeneratorConfig::TimestampRange { start, end } => {
                let start_ts = parse_timestamp(start)
                    .ok_or_else(|| format!("unparseable timestamp_range start '{start}'"))?;
                let end_ts = parse_timestamp(end)
                    .ok_or_else(|| format!("unparseable timestamp_range end '{end}'"))?;
                if start_ts > end_ts {
                    Err(format!("timestamp_range start '{start}' is after end '{end}'"))
                } else {
                    Ok(())
                }
            }
            GeneratorConfig::Static { value } if ScalarValue::from_json(value).is_none() => {
                Err("static value must be a scalar".to_string())
            }
            _ => Ok(()),
        }
    }
}

// ============================================================================
// Columns
// ============================================================================

/// Where a column's values come from.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSource {
    /// Uniform choice from an enumerated, non-empty set
    Candidates(Vec<ScalarValue>),
    /// A synthetic generator
    Generator(GeneratorConfig),
}

/// A single generated column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    /// Column name
    pub name: String,
    /// Storage type token and its parsed kind
    pub storage_type: StorageType,
    /// Value source for the column
    pub source: ColumnSource,
}

impl ColumnSpec {
    /// Create a column that draws from candidate values.
    pub fn candidates(
        name: impl Into<String>,
        storage_type: StorageType,
        values: Vec<ScalarValue>,
    ) -> Self {
        Self {
            name: name.into(),
            storage_type,
            source: ColumnSource::Candidates(values),
        }
    }

    /// Create a column backed by a synthetic generator.
    pub fn generated(
        name: impl Into<String>,
        storage_type: StorageType,
        generator: GeneratorConfig,
    ) -> Self {
        Self {
            name: name.into(),
            storage_type,
            source: ColumnSource::Generator(generator),
        }
    }

    fn validate(&self) -> Result<(), SchemaError> {
        let invalid = |reason: String| SchemaError::InvalidColumn {
            column: self.name.clone(),
            reason,
        };
        validate_identifier(&self.name).map_err(invalid)?;
        match &self.source {
            ColumnSource::Candidates(values) if values.is_empty() => {
                Err(invalid("candidate values must not be empty".to_string()))
            }
            ColumnSource::Candidates(_) => Ok(()),
            ColumnSource::Generator(generator) => generator.validate().map_err(invalid),
        }
    }
}

/// Column definition as written in a schema file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ColumnEntry {
    #[serde(rename = "type")]
    storage_type: StorageType,
    #[serde(default)]
    values: Option<Vec<JsonValue>>,
    #[serde(default)]
    generator: Option<GeneratorConfig>,
}

impl ColumnEntry {
    fn into_spec(self, name: String) -> Result<ColumnSpec, SchemaError> {
        let source = match (self.values, self.generator) {
            (Some(values), None) => {
                let scalars = values
                    .iter()
                    .map(|v| {
                        ScalarValue::from_json(v).ok_or_else(|| SchemaError::InvalidColumn {
                            column: name.clone(),
                            reason: format!("candidate value {v} is not a scalar"),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                ColumnSource::Candidates(scalars)
            }
            (None, Some(generator)) => ColumnSource::Generator(generator),
            (Some(_), Some(_)) => {
                return Err(SchemaError::InvalidColumn {
                    column: name,
                    reason: "set either 'values' or 'generator', not both".to_string(),
                })
            }
            (None, None) => {
                return Err(SchemaError::InvalidColumn {
                    column: name,
                    reason: "missing 'values' or 'generator'".to_string(),
                })
            }
        };
        Ok(ColumnSpec {
            name,
            storage_type: self.storage_type,
            source,
        })
    }
}

// ============================================================================
// Table Schema
// ============================================================================

/// Ordered set of generated columns for one table.
///
/// Immutable once built; shared between workers behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    columns: Vec<ColumnSpec>,
}

impl TableSchema {
    /// Build a schema, checking names and column sources.
    pub fn new(columns: Vec<ColumnSpec>) -> Result<Self, SchemaError> {
        if columns.is_empty() {
            return Err(SchemaError::Empty);
        }
        let mut seen = HashSet::new();
        for column in &columns {
            if column.name.eq_ignore_ascii_case(PRIMARY_KEY_COLUMN) {
                return Err(SchemaError::ReservedColumn(column.name.clone()));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(SchemaError::DuplicateColumn(column.name.clone()));
            }
            column.validate()?;
        }
        Ok(Self { columns })
    }

    /// Load a schema from a file; `.yaml`/`.yml` is parsed as YAML, anything else as JSON.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            _ => Self::from_json(&content),
        }
    }

    /// Parse a schema from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let entries: OrderedColumns = serde_json::from_str(json)?;
        Self::from_entries(entries)
    }

    /// Parse a schema from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, SchemaError> {
        let entries: OrderedColumns = serde_yaml::from_str(yaml)?;
        Self::from_entries(entries)
    }

    fn from_entries(entries: OrderedColumns) -> Result<Self, SchemaError> {
        let columns = entries
            .0
            .into_iter()
            .map(|(name, entry)| entry.into_spec(name))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(columns)
    }

    /// Columns in insertion order.
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get a column by name.
    pub fn get_column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Number of generated columns (the implicit primary key is not counted).
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Always false for a schema built through [`TableSchema::new`].
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Map entries in document order. Duplicate keys are kept so that
/// [`TableSchema::new`] can reject them.
struct OrderedColumns(Vec<(String, ColumnEntry)>);

impl<'de> Deserialize<'de> for OrderedColumns {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = OrderedColumns;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of column name to column definition")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, entry)) = map.next_entry::<String, ColumnEntry>()? {
                    entries.push((name, entry));
                }
                Ok(OrderedColumns(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}
