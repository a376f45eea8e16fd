use std::fmt;
use crate::resolver::ResolveError;

/// Errors raised by query edits
///
/// Apart from `Resolve`, these are caller-contract violations: the edit
/// addressed something that does not exist or is of the wrong shape. The
/// whole edit is abandoned and the query is left as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The path names a stage index past the end of its pipeline
    StageNotFound { stage_index: usize },
    /// A field index past the end of the stage's field list
    FieldNotFound { field_index: usize },
    /// A path descends through a field that is not an inline nested query
    NotANestedQuery { field_index: usize },
    /// A filter index past the end of the filter list
    FilterNotFound { filter_index: usize },
    /// An ordering index past the end of the ordering list
    OrderByNotFound { order_by_index: usize },
    /// A reorder list that is not a permutation of the stage's fields
    InvalidFieldOrder(Vec<usize>),
    /// Filtering a bare name requires renaming it in the same edit
    FilterRequiresRename { field: String },
    /// Filters only attach to refined references
    NotRefinable { field: String },
    /// The edit only applies to bare-name references
    NotABareName { field: String },
    /// The name being loaded is not a query field
    NotAQuery(String),
    /// No definition with this name exists in the given source
    DefinitionNotFound(String),
    /// The field the edit depends on could not be resolved
    Resolve(ResolveError),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::StageNotFound { stage_index } => {
                write!(f, "Stage {} does not exist", stage_index)
            }
            BuildError::FieldNotFound { field_index } => {
                write!(f, "Field {} does not exist", field_index)
            }
            BuildError::NotANestedQuery { field_index } => {
                write!(f, "Path does not refer to a stage correctly: field {} is not a nested query", field_index)
            }
            BuildError::FilterNotFound { filter_index } => {
                write!(f, "Filter {} does not exist", filter_index)
            }
            BuildError::OrderByNotFound { order_by_index } => {
                write!(f, "Ordering {} does not exist", order_by_index)
            }
            BuildError::InvalidFieldOrder(order) => {
                write!(f, "Field order {:?} is not a permutation of the stage's fields", order)
            }
            BuildError::FilterRequiresRename { field } => {
                write!(f, "A new name must be given to filter field '{}'", field)
            }
            BuildError::NotRefinable { field } => {
                write!(f, "Field '{}' has no refinement to hold filters", field)
            }
            BuildError::NotABareName { field } => {
                write!(f, "Field '{}' is not a plain reference", field)
            }
            BuildError::NotAQuery(name) => write!(f, "'{}' does not refer to a query", name),
            BuildError::DefinitionNotFound(name) => {
                write!(f, "Field '{}' is not defined in the source", name)
            }
            BuildError::Resolve(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::Resolve(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResolveError> for BuildError {
    fn from(err: ResolveError) -> Self {
        BuildError::Resolve(err)
    }
}
