//! Renderer overrides ("data styles") attached to named fields and queries

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::schema::FieldKind;

/// Renderers a result column or nested result can be displayed with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Renderer {
    Table,
    BarChart,
    Dashboard,
    Json,
    LineChart,
    List,
    ListDetail,
    PointMap,
    ScatterChart,
    SegmentMap,
    ShapeMap,
    SparkLine,
    Number,
    Boolean,
    Currency,
    Image,
    Link,
    Percent,
    Text,
    Time,
    Bytes,
    Vega,
}

const QUERY_RENDERERS: [Renderer; 12] = [
    Renderer::Table,
    Renderer::BarChart,
    Renderer::Dashboard,
    Renderer::Json,
    Renderer::LineChart,
    Renderer::List,
    Renderer::ListDetail,
    Renderer::PointMap,
    Renderer::ScatterChart,
    Renderer::SegmentMap,
    Renderer::ShapeMap,
    Renderer::SparkLine,
];

const ATOMIC_RENDERERS: [Renderer; 8] = [
    Renderer::Number,
    Renderer::Boolean,
    Renderer::Currency,
    Renderer::Image,
    Renderer::Link,
    Renderer::Percent,
    Renderer::Text,
    Renderer::Time,
];

/// Renderers a user may pick for a field of the given kind
pub fn allowed_renderers(kind: FieldKind) -> Vec<Renderer> {
    if kind.is_query_like() {
        QUERY_RENDERERS.to_vec()
    } else {
        ATOMIC_RENDERERS.to_vec()
    }
}

/// A style override for one named field or query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer: Option<Renderer>,
}

impl DataStyle {
    pub fn renderer(renderer: Renderer) -> Self {
        Self {
            renderer: Some(renderer),
        }
    }
}

/// Style overrides keyed by field or query name
pub type DataStyles = BTreeMap<String, DataStyle>;
