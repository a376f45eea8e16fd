//! Source resolution (verb module)
//!
//! Turns field references into field definitions and simulates how each
//! stage reshapes the schema visible to the stage after it.

mod error;
mod resolve;

pub use error::ResolveError;
pub use resolve::{
    field_def_for_query_field,
    resolve_field,
    transform_schema_for_pipeline,
    transform_schema_for_stage,
};
