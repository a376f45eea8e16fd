//! Source schema tree: containers, leaf fields and query fields

use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use super::types::{FieldKind, FieldType};
use crate::pipeline::Stage;

/// A container of fields, addressable by name
///
/// The root source of a query is a `StructDef`, and so is every joined
/// or nested record inside it. Field names are unique within a container
/// once aliases are taken into account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructDef {
    pub name: String,
    /// Optional alias the container is exposed under
    #[serde(rename = "as", default, skip_serializing_if = "Option::is_none")]
    pub as_name: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl StructDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            as_name: None,
            fields: Vec::new(),
        }
    }

    pub fn with_fields(mut self, fields: Vec<FieldDef>) -> Self {
        self.fields = fields;
        self
    }

    /// The degenerate schema produced when a stage cannot be analyzed
    pub fn placeholder() -> Self {
        Self::new("pipe_stage")
    }

    /// Name the container is referenced by (alias if set)
    pub fn display_name(&self) -> &str {
        self.as_name.as_deref().unwrap_or(&self.name)
    }

    /// Get a direct child field by its visible name
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.display_name() == name)
    }
}

/// A leaf field with a scalar type
///
/// Inline definitions carry the expression text they were compiled from
/// in `code`; fields read from a table usually have none.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomicFieldDef {
    pub name: String,
    pub as_name: Option<String>,
    pub field_type: FieldType,
    /// True for measures
    pub aggregate: bool,
    pub code: Option<String>,
}

impl AtomicFieldDef {
    pub fn dimension(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            as_name: None,
            field_type,
            aggregate: false,
            code: None,
        }
    }

    pub fn measure(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            aggregate: true,
            ..Self::dimension(name, field_type)
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// A query field: a named pipeline evaluated against its containing source
#[derive(Debug, Clone, PartialEq)]
pub struct TurtleDef {
    pub name: String,
    pub as_name: Option<String>,
    pub pipeline: Vec<Stage>,
}

impl TurtleDef {
    /// A query with a single empty stage
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            as_name: None,
            pipeline: vec![Stage::default()],
        }
    }

    pub fn with_pipeline(mut self, pipeline: Vec<Stage>) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn display_name(&self) -> &str {
        self.as_name.as_deref().unwrap_or(&self.name)
    }
}

/// A node of the source schema tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawField", into = "RawField")]
pub enum FieldDef {
    /// Scalar leaf (dimension or measure)
    Atomic(AtomicFieldDef),
    /// Container of other fields
    Struct(StructDef),
    /// Query field owning a pipeline
    Query(TurtleDef),
}

impl FieldDef {
    pub fn name(&self) -> &str {
        match self {
            FieldDef::Atomic(a) => &a.name,
            FieldDef::Struct(s) => &s.name,
            FieldDef::Query(t) => &t.name,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            FieldDef::Atomic(a) => a.as_name.as_deref(),
            FieldDef::Struct(s) => s.as_name.as_deref(),
            FieldDef::Query(t) => t.as_name.as_deref(),
        }
    }

    /// Name the field is referenced by (alias if set)
    pub fn display_name(&self) -> &str {
        self.as_name().unwrap_or_else(|| self.name())
    }

    pub fn set_as_name(&mut self, as_name: impl Into<String>) {
        let as_name = Some(as_name.into());
        match self {
            FieldDef::Atomic(a) => a.as_name = as_name,
            FieldDef::Struct(s) => s.as_name = as_name,
            FieldDef::Query(t) => t.as_name = as_name,
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldDef::Struct(_) => FieldKind::Source,
            FieldDef::Query(_) => FieldKind::Query,
            FieldDef::Atomic(a) if a.aggregate => FieldKind::Measure,
            FieldDef::Atomic(_) => FieldKind::Dimension,
        }
    }

    /// Grouped-layout position: dimension=0, measure=1, query=2, container=3
    pub fn sort_order(&self) -> u8 {
        self.kind().sort_order()
    }

    pub fn as_atomic(&self) -> Option<&AtomicFieldDef> {
        match self {
            FieldDef::Atomic(a) => Some(a),
            _ => None,
        }
    }
}

impl From<AtomicFieldDef> for FieldDef {
    fn from(def: AtomicFieldDef) -> Self {
        FieldDef::Atomic(def)
    }
}

impl From<StructDef> for FieldDef {
    fn from(def: StructDef) -> Self {
        FieldDef::Struct(def)
    }
}

impl From<TurtleDef> for FieldDef {
    fn from(def: TurtleDef) -> Self {
        FieldDef::Query(def)
    }
}

// ============================================================================
// Serialized form
// ============================================================================

/// Flat on-disk shape of a field, discriminated by `type`
///
/// `type` is either a scalar type name, `struct`, or `query`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawField {
    name: String,
    #[serde(rename = "as", default, skip_serializing_if = "Option::is_none")]
    as_name: Option<String>,
    #[serde(rename = "type")]
    field_type: String,
    #[serde(default, skip_serializing_if = "is_false")]
    aggregate: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    fields: Vec<FieldDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pipeline: Vec<Stage>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl TryFrom<RawField> for FieldDef {
    type Error = String;

    fn try_from(raw: RawField) -> Result<Self, Self::Error> {
        match raw.field_type.as_str() {
            "struct" => Ok(FieldDef::Struct(StructDef {
                name: raw.name,
                as_name: raw.as_name,
                fields: raw.fields,
            })),
            "query" | "turtle" => {
                let pipeline = if raw.pipeline.is_empty() {
                    vec![Stage::default()]
                } else {
                    raw.pipeline
                };
                Ok(FieldDef::Query(TurtleDef {
                    name: raw.name,
                    as_name: raw.as_name,
                    pipeline,
                }))
            }
            other => {
                let field_type = other
                    .parse::<FieldType>()
                    .map_err(|e| format!("field '{}': {}", raw.name, e))?;
                Ok(FieldDef::Atomic(AtomicFieldDef {
                    name: raw.name,
                    as_name: raw.as_name,
                    field_type,
                    aggregate: raw.aggregate,
                    code: raw.code,
                }))
            }
        }
    }
}

impl From<FieldDef> for RawField {
    fn from(def: FieldDef) -> Self {
        let mut raw = RawField {
            name: String::new(),
            as_name: None,
            field_type: String::new(),
            aggregate: false,
            code: None,
            fields: Vec::new(),
            pipeline: Vec::new(),
        };
        match def {
            FieldDef::Atomic(a) => {
                raw.name = a.name;
                raw.as_name = a.as_name;
                raw.field_type = a.field_type.to_string();
                raw.aggregate = a.aggregate;
                raw.code = a.code;
            }
            FieldDef::Struct(s) => {
                raw.name = s.name;
                raw.as_name = s.as_name;
                raw.field_type = "struct".to_string();
                raw.fields = s.fields;
            }
            FieldDef::Query(t) => {
                raw.name = t.name;
                raw.as_name = t.as_name;
                raw.field_type = "query".to_string();
                raw.pipeline = t.pipeline;
            }
        }
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_prefers_alias() {
        let mut field = FieldDef::from(AtomicFieldDef::dimension("state", FieldType::String));
        assert_eq!(field.display_name(), "state");
        field.set_as_name("region");
        assert_eq!(field.display_name(), "region");
        assert_eq!(field.name(), "state");
    }

    #[test]
    fn test_kind_classification() {
        let dim = FieldDef::from(AtomicFieldDef::dimension("state", FieldType::String));
        let measure = FieldDef::from(AtomicFieldDef::measure("count", FieldType::Number));
        let query = FieldDef::from(TurtleDef::new("by_state"));
        let container = FieldDef::from(StructDef::new("aircraft"));

        assert_eq!(dim.kind(), FieldKind::Dimension);
        assert_eq!(measure.kind(), FieldKind::Measure);
        assert_eq!(query.kind(), FieldKind::Query);
        assert_eq!(container.kind(), FieldKind::Source);
        assert_eq!(container.sort_order(), 3);
    }

    #[test]
    fn test_get_field_by_alias() {
        let mut aliased = AtomicFieldDef::dimension("st", FieldType::String);
        aliased.as_name = Some("state".to_string());
        let source = StructDef::new("flights").with_fields(vec![aliased.into()]);

        assert!(source.get_field("state").is_some());
        assert!(source.get_field("st").is_none());
    }

    #[test]
    fn test_deserialize_field_tree() {
        let yaml = r#"
name: flights
fields:
  - name: state
    type: string
  - name: count
    type: number
    aggregate: true
    code: count()
  - name: aircraft
    type: struct
    fields:
      - name: model
        type: string
  - name: by_state
    type: query
    pipeline:
      - fields: [state, count]
"#;
        let source: StructDef = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(source.fields.len(), 4);
        assert_eq!(source.get_field("count").unwrap().kind(), FieldKind::Measure);
        assert!(matches!(source.get_field("aircraft"), Some(FieldDef::Struct(s)) if s.fields.len() == 1));
        match source.get_field("by_state") {
            Some(FieldDef::Query(t)) => assert_eq!(t.pipeline[0].fields.len(), 2),
            other => panic!("expected query field, got {:?}", other),
        }
    }

    #[test]
    fn test_deserialize_unknown_type_fails() {
        let yaml = "name: x\ntype: blob\n";
        let result: Result<FieldDef, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_query_without_pipeline_gets_empty_stage() {
        let yaml = "name: q\ntype: query\n";
        let field: FieldDef = serde_yaml::from_str(yaml).unwrap();
        match field {
            FieldDef::Query(t) => assert_eq!(t.pipeline.len(), 1),
            other => panic!("expected query field, got {:?}", other),
        }
    }
}
