//! Query summary types (nouns)
//!
//! What a UI renders to show the current contents of a query.

mod item;
mod style;

pub use item::{
    QuerySummary, StageSummary, QuerySummaryItem,
    FilterItem, FieldItem, FieldDefinitionItem, NestedQueryItem,
    LimitItem, OrderByField, OrderByItem, DataStyleItem, ErrorFieldItem,
};
pub use style::{allowed_renderers, DataStyle, DataStyles, Renderer};
