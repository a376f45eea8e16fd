//! Query editing
//!
//! `QueryBuilder` owns the query definition and applies one edit at a time.

mod error;
mod query_builder;

pub use error::BuildError;
pub use query_builder::QueryBuilder;
