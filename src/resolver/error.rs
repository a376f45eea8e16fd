use std::fmt;

/// Errors that can occur while resolving a field reference against a schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The terminal segment of a path has no match
    FieldNotFound(String),
    /// An intermediate segment of a path has no match
    InnerFieldNotFound(String),
    /// An intermediate segment names a leaf field
    NotASource(String),
    /// A container was selected where a dimension, measure or query belongs
    UnsupportedStructField(String),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::FieldNotFound(name) => write!(f, "Could not find {}", name),
            ResolveError::InnerFieldNotFound(name) => write!(f, "Could not find (inner) {}", name),
            ResolveError::NotASource(name) => {
                write!(f, "Inner segment '{}' in path is not a source", name)
            }
            ResolveError::UnsupportedStructField(name) => {
                write!(f, "Field '{}' is a source and cannot be selected directly", name)
            }
        }
    }
}

impl std::error::Error for ResolveError {}
