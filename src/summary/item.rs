//! Query summary tree
//!
//! A display-only projection of a pipeline, rebuilt from scratch after
//! every edit. One `StageSummary` per stage; nested queries carry their own
//! list of stage summaries.

use serde::Serialize;
use super::style::Renderer;
use crate::pipeline::{Direction, QueryField};
use crate::schema::{FieldDef, FieldKind, FieldType, StructDef};

/// Summary of a whole pipeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuerySummary {
    pub stages: Vec<StageSummary>,
}

impl QuerySummary {
    /// Serialize the summary for a UI layer
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Summary of one stage, in document order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageSummary {
    pub items: Vec<QuerySummaryItem>,
    /// Atomic fields an ordering entry may target
    pub order_by_fields: Vec<OrderByField>,
    /// Schema the stage reads from
    pub input_source: StructDef,
}

/// One row of a stage summary
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuerySummaryItem {
    Filter(FilterItem),
    Field(FieldItem),
    FieldDefinition(FieldDefinitionItem),
    NestedQueryDefinition(NestedQueryItem),
    Limit(LimitItem),
    OrderBy(OrderByItem),
    DataStyle(DataStyleItem),
    ErrorField(ErrorFieldItem),
}

/// A filter, either stage-level or attached to a refined field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterItem {
    pub filter_source: String,
    pub filter_index: usize,
}

/// A bare or refined reference to a schema field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldItem {
    /// The resolved definition
    pub field: FieldDef,
    pub field_index: usize,
    /// Visible name (alias if renamed)
    pub name: String,
    /// Path the reference resolves through
    pub path: String,
    pub kind: FieldKind,
    pub is_refined: bool,
    pub is_renamed: bool,
    pub filters: Vec<FilterItem>,
    pub styles: Vec<DataStyleItem>,
    /// Definition to store when the refinement is saved as a named field
    pub save_definition: Option<FieldDef>,
}

/// An inline dimension or measure definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDefinitionItem {
    pub name: String,
    pub field: FieldDef,
    pub field_index: usize,
    /// Expression text of the definition
    pub source: Option<String>,
    pub kind: FieldKind,
    pub styles: Vec<DataStyleItem>,
    pub save_definition: Option<FieldDef>,
}

/// An inline nested query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NestedQueryItem {
    pub name: String,
    pub field_index: usize,
    pub stages: Vec<StageSummary>,
    pub styles: Vec<DataStyleItem>,
    pub save_definition: Option<FieldDef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LimitItem {
    pub limit: u64,
}

/// The field an ordering entry refers to, as it currently resolves
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderByField {
    pub name: String,
    pub field_index: usize,
    pub field_type: FieldType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderByItem {
    pub by_field: OrderByField,
    pub direction: Option<Direction>,
    pub order_by_index: usize,
}

/// A renderer override in effect for a field or the query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataStyleItem {
    pub renderer: Renderer,
    pub style_key: String,
    /// True when the override was set by the user rather than the model
    pub can_remove: bool,
    pub allowed_renderers: Vec<Renderer>,
}

/// A field reference that no longer resolves
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorFieldItem {
    pub field: QueryField,
    pub name: String,
    pub error: String,
    pub field_index: usize,
}

impl QuerySummaryItem {
    /// Field index for items that stand for a field of the stage
    pub fn field_index(&self) -> Option<usize> {
        match self {
            QuerySummaryItem::Field(item) => Some(item.field_index),
            QuerySummaryItem::FieldDefinition(item) => Some(item.field_index),
            QuerySummaryItem::NestedQueryDefinition(item) => Some(item.field_index),
            QuerySummaryItem::ErrorField(item) => Some(item.field_index),
            _ => None,
        }
    }
}
