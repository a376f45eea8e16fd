//! Field references held by a stage

use serde::{Deserialize, Serialize};
use super::stage::FilterExpression;
use crate::schema::FieldDef;

/// A reference to a schema field refined with an alias and/or filters
///
/// Refining never redefines the field: `name` must still resolve against
/// the stage's input schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RefinedField {
    pub name: String,
    #[serde(rename = "as", default, skip_serializing_if = "Option::is_none")]
    pub as_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FilterExpression>,
}

impl RefinedField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            as_name: None,
            filters: Vec::new(),
        }
    }

    pub fn with_alias(mut self, as_name: impl Into<String>) -> Self {
        self.as_name = Some(as_name.into());
        self
    }

    pub fn with_filters(mut self, filters: Vec<FilterExpression>) -> Self {
        self.filters = filters;
        self
    }

    /// Output column name: the alias, else the last segment of `name`
    pub fn display_name(&self) -> &str {
        self.as_name.as_deref().unwrap_or_else(|| last_segment(&self.name))
    }
}

/// One entry of a stage's field list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryField {
    /// Bare name of a field in the stage's input schema
    Name(String),
    /// Name with alias and/or filters
    Refined(RefinedField),
    /// Self-contained inline definition (expression or nested query)
    Definition(FieldDef),
}

impl QueryField {
    /// The name this reference is visible under in the stage's output
    ///
    /// An unaliased dotted reference such as `aircraft.model` becomes the
    /// column `model`.
    pub fn name(&self) -> &str {
        match self {
            QueryField::Name(name) => last_segment(name),
            QueryField::Refined(refined) => refined.display_name(),
            QueryField::Definition(def) => def.display_name(),
        }
    }

    /// The reference as written, dotted path included
    pub fn path(&self) -> &str {
        match self {
            QueryField::Name(name) => name,
            QueryField::Refined(refined) => &refined.name,
            QueryField::Definition(def) => def.display_name(),
        }
    }

    pub fn as_refined_mut(&mut self) -> Option<&mut RefinedField> {
        match self {
            QueryField::Refined(refined) => Some(refined),
            _ => None,
        }
    }
}

/// Column name of a dotted field path
pub(crate) fn last_segment(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

impl From<&str> for QueryField {
    fn from(name: &str) -> Self {
        QueryField::Name(name.to_string())
    }
}

impl From<String> for QueryField {
    fn from(name: String) -> Self {
        QueryField::Name(name)
    }
}

impl From<RefinedField> for QueryField {
    fn from(refined: RefinedField) -> Self {
        QueryField::Refined(refined)
    }
}

impl From<FieldDef> for QueryField {
    fn from(def: FieldDef) -> Self {
        QueryField::Definition(def)
    }
}
