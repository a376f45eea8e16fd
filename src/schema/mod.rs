//! Source schema types (nouns)
//!
//! A source schema is a tree of containers, leaf fields and query fields
//! supplied by the surrounding application. The core only reads it.

mod field;
mod types;

pub use field::{AtomicFieldDef, FieldDef, StructDef, TurtleDef};
pub use types::{FieldKind, FieldType, ParseFieldTypeError};
