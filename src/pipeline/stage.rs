//! Pipeline stage types

use serde::{Deserialize, Serialize};
use std::fmt;
use super::field_ref::QueryField;

/// A compiled filter condition
///
/// `code` is the literal source text the filter was compiled from; it is
/// what gets written back out and what de-duplication compares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterExpression {
    pub code: String,
    /// True when the condition references aggregates
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub aggregate: bool,
}

impl FilterExpression {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            aggregate: false,
        }
    }
}

/// Sort direction of an ordering entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => write!(f, "asc"),
            Direction::Desc => write!(f, "desc"),
        }
    }
}

/// One ordering entry, keyed by the field's visible name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

impl OrderBy {
    pub fn new(field: impl Into<String>, direction: Option<Direction>) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// "Top-N by field" shorthand ordering
///
/// Mutually exclusive with an explicit ordering list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopBy {
    pub field: String,
}

/// One grouping/aggregation step of a pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    #[serde(default)]
    pub fields: Vec<QueryField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FilterExpression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by: Option<TopBy>,
}

impl Stage {
    pub fn with_fields(mut self, fields: Vec<QueryField>) -> Self {
        self.fields = fields;
        self
    }

    /// Index of the first field whose visible name is `name`
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name() == name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
            && self.filters.is_empty()
            && self.limit.is_none()
            && self.order_by.is_empty()
            && self.by.is_none()
    }
}
