//! Fragment compiler interface
//!
//! Type-checking a piece of query text against a source is done by an
//! external compiler. The builder never calls it; an application compiles
//! user input first and hands the resulting definition to the builder.

use std::fmt;
use crate::pipeline::FilterExpression;
use crate::schema::{FieldDef, StructDef, TurtleDef};

/// A fragment the compiler rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    pub message: String,
    /// 1-based line of the fragment the problem was found on
    pub line: Option<usize>,
}

impl CompileError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {}: {}", line, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for CompileError {}

/// Compiles text fragments against a source schema
pub trait FragmentCompiler {
    /// A filter condition, e.g. `state = 'CA'`
    fn compile_filter(&self, source: &StructDef, code: &str) -> Result<FilterExpression, CompileError>;

    /// A non-aggregate expression named `name`
    fn compile_dimension(&self, source: &StructDef, name: &str, code: &str) -> Result<FieldDef, CompileError>;

    /// An aggregate expression named `name`
    fn compile_measure(&self, source: &StructDef, name: &str, code: &str) -> Result<FieldDef, CompileError>;

    /// A complete query, as produced by `QueryWriter::query_text`
    fn compile_query(&self, source: &StructDef, text: &str) -> Result<TurtleDef, CompileError>;
}
