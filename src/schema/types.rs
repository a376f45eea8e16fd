//! Scalar type and field role definitions for source schemas

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Scalar types a leaf field can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Variable-length string
    String,
    /// Any numeric value (integer or floating point)
    Number,
    /// Boolean
    Boolean,
    /// Calendar date
    Date,
    /// Point in time
    Timestamp,
}

impl Default for FieldType {
    fn default() -> Self {
        FieldType::String
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::String => write!(f, "string"),
            FieldType::Number => write!(f, "number"),
            FieldType::Boolean => write!(f, "boolean"),
            FieldType::Date => write!(f, "date"),
            FieldType::Timestamp => write!(f, "timestamp"),
        }
    }
}

/// Error when parsing a field type string
#[derive(Debug, Clone)]
pub struct ParseFieldTypeError {
    pub input: String,
}

impl fmt::Display for ParseFieldTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown field type '{}'. Valid options: string, number, boolean, date, timestamp",
            self.input
        )
    }
}

impl std::error::Error for ParseFieldTypeError {}

impl FromStr for FieldType {
    type Err = ParseFieldTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "string" | "text" | "varchar" => Ok(FieldType::String),
            "number" | "int" | "integer" | "float" | "double" | "decimal" => Ok(FieldType::Number),
            "boolean" | "bool" => Ok(FieldType::Boolean),
            "date" => Ok(FieldType::Date),
            "timestamp" | "datetime" => Ok(FieldType::Timestamp),
            _ => Err(ParseFieldTypeError { input: s.to_string() }),
        }
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FieldType::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for FieldType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

// ============================================================================
// FieldKind
// ============================================================================

/// The role a field plays once selected into a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Grouping value (non-aggregate leaf)
    Dimension,
    /// Aggregate leaf
    Measure,
    /// Query field owning its own pipeline
    Query,
    /// Container of other fields
    Source,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Dimension => write!(f, "dimension"),
            FieldKind::Measure => write!(f, "measure"),
            FieldKind::Query => write!(f, "query"),
            FieldKind::Source => write!(f, "source"),
        }
    }
}

impl FieldKind {
    /// Position of this kind in a stage's grouped field layout.
    ///
    /// Dimensions come first, then measures, then nested queries.
    pub fn sort_order(self) -> u8 {
        match self {
            FieldKind::Dimension => 0,
            FieldKind::Measure => 1,
            FieldKind::Query => 2,
            FieldKind::Source => 3,
        }
    }

    /// Check if this kind renders with query-level renderers (tables, charts)
    pub fn is_query_like(self) -> bool {
        matches!(self, FieldKind::Query | FieldKind::Source)
    }
}
