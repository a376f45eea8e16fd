//! querycraft - Build analytical queries one edit at a time
//!
//! This library provides:
//! - Source schema types (containers, dimensions, measures, query fields)
//! - Schema and configuration parsing from YAML
//! - Pipeline definitions with value-based stage addressing
//! - An edit engine for pipelines (fields, filters, limits, ordering, stages)
//! - Query text generation and a display-oriented summary tree
//! - Structured filters rendered to filter code
//!
//! # Architecture
//!
//! **Noun modules** (data structures):
//! - `schema/` - source schema (StructDef, FieldDef, FieldType, FieldKind)
//! - `pipeline/` - query definition (Stage, QueryField, StagePath)
//! - `summary/` - summary tree and renderer styles (QuerySummary, DataStyles)
//!
//! **Verb modules** (transformations):
//! - `parser/` - YAML → StructDef / ComposerConfig
//! - `resolver/` - StructDef + field reference → FieldDef; Stage → output schema
//! - `builder/` - edit operations on a query (QueryBuilder)
//! - `writer/` - query → source text + summary tree (QueryWriter)
//! - `filters/` - structured filter → filter code
//! - `compiler` - interface to the external fragment compiler
//!
//! # Example
//!
//! ```ignore
//! use querycraft::{parser, DataStyles, QueryBuilder, QueryWriter, StagePath};
//!
//! let source = parser::parse_file("flights.yaml")?;
//! let mut builder = QueryBuilder::new(source);
//! let stage = StagePath::top(0);
//! builder.toggle_field(&stage, "state")?;
//! builder.toggle_field(&stage, "count")?;
//! builder.add_limit(&stage, 10, None, None)?;
//!
//! let writer = QueryWriter::new(builder.query(), builder.source());
//! println!("{}", writer.query_text());
//! let summary = writer.summary(&DataStyles::new(), &DataStyles::new());
//! ```

pub mod schema;
pub mod pipeline;
pub mod summary;
pub mod config;
pub mod parser;
pub mod resolver;
pub mod builder;
pub mod writer;
pub mod filters;
pub mod compiler;
pub mod error;

// Re-export commonly used types
pub use schema::{AtomicFieldDef, FieldDef, FieldKind, FieldType, StructDef, TurtleDef};
pub use pipeline::{Direction, FilterExpression, OrderBy, QueryField, RefinedField, Stage, StagePath, TopBy};
pub use summary::{DataStyle, DataStyles, QuerySummary, QuerySummaryItem, Renderer, StageSummary};
pub use config::ComposerConfig;
pub use resolver::{resolve_field, ResolveError};
pub use builder::{BuildError, QueryBuilder};
pub use writer::{render_fragments, Fragment, QueryWriter};
pub use filters::StructuredFilter;
pub use compiler::{CompileError, FragmentCompiler};
pub use error::ParseError;
