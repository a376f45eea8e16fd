//! Stage path addressing
//!
//! A `StagePath` locates one stage anywhere in a query: `parts` lists, from
//! the outermost pipeline inwards, which stage and which nested query field
//! to descend through, and `stage_index` names the terminal stage inside the
//! innermost pipeline. Paths are values; every operation here builds a new
//! one instead of mutating.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One descent through a nested query field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StagePathPart {
    pub stage_index: usize,
    pub field_index: usize,
}

/// Locator of a stage, possibly nested inside query fields of outer stages
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StagePath {
    pub stage_index: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<StagePathPart>,
}

/// A step pushed onto or popped off a path
///
/// `field_index` is the field of the enclosing stage being nested through;
/// it is absent only for the outermost step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StageStep {
    pub stage_index: usize,
    pub field_index: Option<usize>,
}

impl StageStep {
    pub fn top(stage_index: usize) -> Self {
        Self {
            stage_index,
            field_index: None,
        }
    }

    pub fn nested(stage_index: usize, field_index: usize) -> Self {
        Self {
            stage_index,
            field_index: Some(field_index),
        }
    }
}

/// The immediately enclosing location of a stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageParent {
    /// Path of the stage owning the nested query, `None` at top level
    pub path: Option<StagePath>,
    /// Index of the stage within its own pipeline
    pub stage_index: usize,
    /// Field of the parent stage holding the pipeline, `None` at top level
    pub field_index: Option<usize>,
}

/// Errors from building a stage path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A nested step was pushed without naming the field it descends through
    MissingFieldIndex { stage_index: usize },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::MissingFieldIndex { stage_index } => write!(
                f,
                "Nested step into stage {} requires a field index",
                stage_index
            ),
        }
    }
}

impl std::error::Error for PathError {}

impl StagePath {
    /// Path to a stage of the top-level pipeline
    pub fn top(stage_index: usize) -> Self {
        Self {
            stage_index,
            parts: Vec::new(),
        }
    }

    /// Path to a stage inside the query field `field_index` of this path's stage
    pub fn nested(&self, field_index: usize, stage_index: usize) -> Self {
        let mut parts = self.parts.clone();
        parts.push(StagePathPart {
            stage_index: self.stage_index,
            field_index,
        });
        Self { stage_index, parts }
    }

    /// Number of nested query fields between the top level and this stage
    pub fn depth(&self) -> usize {
        self.parts.len()
    }

    pub fn is_top_level(&self) -> bool {
        self.parts.is_empty()
    }
}

impl fmt::Display for StagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            write!(f, "{}.{}/", part.stage_index, part.field_index)?;
        }
        write!(f, "{}", self.stage_index)
    }
}

/// Append a nesting step to a path
///
/// The first push (onto no path) creates a top-level path and needs no
/// field index; any field index given there is ignored. Every later push
/// must say which field of the current terminal stage it descends through.
pub fn push(path: Option<&StagePath>, step: StageStep) -> Result<StagePath, PathError> {
    match path {
        None => Ok(StagePath::top(step.stage_index)),
        Some(path) => {
            let field_index = step.field_index.ok_or(PathError::MissingFieldIndex {
                stage_index: step.stage_index,
            })?;
            Ok(path.nested(field_index, step.stage_index))
        }
    }
}

/// Remove the innermost step of a path
///
/// Returns the step together with the remaining path; the remaining path is
/// `None` when the popped step was the outermost one.
pub fn pop(path: &StagePath) -> (StageStep, Option<StagePath>) {
    match path.parts.split_last() {
        None => (StageStep::top(path.stage_index), None),
        Some((last, rest)) => (
            StageStep::nested(path.stage_index, last.field_index),
            Some(StagePath {
                stage_index: last.stage_index,
                parts: rest.to_vec(),
            }),
        ),
    }
}

/// The enclosing path of a stage and the field index nested through
pub fn parent(path: &StagePath) -> StageParent {
    let (step, rest) = pop(path);
    StageParent {
        path: rest,
        stage_index: step.stage_index,
        field_index: step.field_index,
    }
}
