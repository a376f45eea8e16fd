//! Pipeline definition types (nouns)
//!
//! A pipeline is an ordered list of stages. Stages hold field references,
//! and a field reference may be an inline query whose own pipeline nests
//! arbitrarily deep; `path` addresses stages inside that tree by value.

mod field_ref;
pub mod path;
mod stage;

pub use field_ref::{QueryField, RefinedField};
pub(crate) use field_ref::last_segment;
pub use path::{StagePath, StagePathPart, StageStep, StageParent, PathError};
pub use stage::{Direction, FilterExpression, OrderBy, Stage, TopBy};
