//! The query builder: in-place edits of a pipeline definition

use tracing::{debug, warn};
use crate::config::ComposerConfig;
use crate::pipeline::path::parent;
use crate::pipeline::{
    last_segment, Direction, FilterExpression, OrderBy, QueryField, RefinedField, Stage,
    StagePath, StagePathPart,
};
use crate::resolver::{field_def_for_query_field, resolve_field, transform_schema_for_pipeline};
use crate::schema::{FieldDef, StructDef, TurtleDef};
use super::error::BuildError;

/// Holds the query being composed and applies edits to it
///
/// Every edit either completes or leaves the query untouched and returns a
/// `BuildError`. Text and summary are derived separately by the writer.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    source: StructDef,
    query: TurtleDef,
}

impl QueryBuilder {
    /// Start a new query with one empty stage over `source`
    pub fn new(source: StructDef) -> Self {
        Self::with_config(source, &ComposerConfig::default())
    }

    pub fn with_config(source: StructDef, config: &ComposerConfig) -> Self {
        Self {
            source,
            query: TurtleDef::new(config.default_query_name.clone()),
        }
    }

    /// Swap the root schema, keeping the pipeline as is
    pub fn update_source(&mut self, source: StructDef) {
        debug!(source = %source.display_name(), "update source");
        self.source = source;
    }

    pub fn source(&self) -> &StructDef {
        &self.source
    }

    pub fn query(&self) -> &TurtleDef {
        &self.query
    }

    pub fn name(&self) -> &str {
        self.query.display_name()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.query.name = name.into();
        self.query.as_name = None;
    }

    /// A query can run once its first stage selects something
    pub fn can_run(&self) -> bool {
        self.query
            .pipeline
            .first()
            .map_or(false, |stage| !stage.fields.is_empty())
    }

    /// Read access to the stage at `path`
    pub fn stage(&self, path: &StagePath) -> Result<&Stage, BuildError> {
        let pipeline = pipeline_at(&self.query.pipeline, &path.parts)?;
        pipeline.get(path.stage_index).ok_or(BuildError::StageNotFound {
            stage_index: path.stage_index,
        })
    }

    fn stage_mut(&mut self, path: &StagePath) -> Result<&mut Stage, BuildError> {
        let pipeline = pipeline_at_mut(&mut self.query.pipeline, &path.parts)?;
        pipeline.get_mut(path.stage_index).ok_or(BuildError::StageNotFound {
            stage_index: path.stage_index,
        })
    }

    /// The schema the stage at `path` reads from
    pub fn source_for_stage(&self, path: &StagePath) -> Result<StructDef, BuildError> {
        let mut pipeline: &[Stage] = &self.query.pipeline;
        let mut source = self.source.clone();
        for part in &path.parts {
            source = advance(&source, pipeline, part.stage_index)?;
            pipeline = nested_pipeline(&pipeline[part.stage_index], part.field_index)?;
        }
        advance(&source, pipeline, path.stage_index)
    }

    // ========================================================================
    // Fields
    // ========================================================================

    /// Index of the first field equal to `field`
    pub fn field_index(&self, path: &StagePath, field: &QueryField) -> Result<Option<usize>, BuildError> {
        Ok(self.stage(path)?.fields.iter().position(|f| f == field))
    }

    pub fn has_field(&self, path: &StagePath, field: &QueryField) -> Result<bool, BuildError> {
        Ok(self.field_index(path, field)?.is_some())
    }

    /// Remove `field` if the stage has it, otherwise insert it
    pub fn toggle_field(&mut self, path: &StagePath, field: impl Into<QueryField>) -> Result<(), BuildError> {
        let field = field.into();
        debug!(path = %path, field = field.name(), "toggle field");
        match self.field_index(path, &field)? {
            Some(index) => self.remove_field(path, index),
            None => self.insert_field(path, field).map(|_| ()),
        }
    }

    /// Insert a field reference at its grouped position; returns its index
    pub fn add_field(&mut self, path: &StagePath, field: impl Into<QueryField>) -> Result<usize, BuildError> {
        let field = field.into();
        debug!(path = %path, field = field.name(), "add field");
        self.insert_field(path, field)
    }

    /// Insert a new inline dimension, measure or query definition
    pub fn add_new_field(&mut self, path: &StagePath, definition: FieldDef) -> Result<usize, BuildError> {
        debug!(path = %path, field = definition.display_name(), "add new field");
        self.insert_field(path, QueryField::Definition(definition))
    }

    /// Insert an empty nested query named `name`
    pub fn add_new_nested_query(&mut self, path: &StagePath, name: &str) -> Result<usize, BuildError> {
        debug!(path = %path, name, "add nested query");
        let nested = FieldDef::Query(TurtleDef::new(name));
        self.insert_field(path, QueryField::Definition(nested))
    }

    /// The new field goes just before the first existing field with a
    /// strictly greater sort order. Existing fields that no longer resolve
    /// are skipped rather than failing the insertion.
    fn insert_field(&mut self, path: &StagePath, field: QueryField) -> Result<usize, BuildError> {
        let source = self.source_for_stage(path)?;
        let order = field_def_for_query_field(&field, &source)?.sort_order();

        let stage = self.stage_mut(path)?;
        let index = stage
            .fields
            .iter()
            .position(|existing| match field_def_for_query_field(existing, &source) {
                Ok(def) => def.sort_order() > order,
                Err(err) => {
                    warn!(field = existing.name(), error = %err, "skipping unresolvable field while ordering");
                    false
                }
            })
            .unwrap_or(stage.fields.len());

        stage.fields.insert(index, field);
        Ok(index)
    }

    /// Remove a field and every ordering entry that names it
    pub fn remove_field(&mut self, path: &StagePath, field_index: usize) -> Result<(), BuildError> {
        debug!(path = %path, field_index, "remove field");
        let stage = self.stage_mut(path)?;
        let name = field_at(stage, field_index)?.name().to_string();

        stage.order_by.retain(|order| order.field != name);
        if stage.by.as_ref().map_or(false, |by| by.field == name) {
            stage.by = None;
        }
        stage.fields.remove(field_index);
        Ok(())
    }

    /// Rearrange fields; `order[i]` is the current index of the field that
    /// should end up at position `i`
    pub fn reorder_fields(&mut self, path: &StagePath, order: &[usize]) -> Result<(), BuildError> {
        debug!(path = %path, ?order, "reorder fields");
        let stage = self.stage_mut(path)?;

        let mut seen = vec![false; stage.fields.len()];
        let is_permutation = order.len() == seen.len()
            && order
                .iter()
                .all(|&i| i < seen.len() && !std::mem::replace(&mut seen[i], true));
        if !is_permutation {
            return Err(BuildError::InvalidFieldOrder(order.to_vec()));
        }

        stage.fields = order.iter().map(|&i| stage.fields[i].clone()).collect();
        Ok(())
    }

    /// Give a field a new visible name
    ///
    /// A bare name becomes a refinement carrying the alias. Ordering entries
    /// that used the old name follow the rename.
    pub fn rename_field(&mut self, path: &StagePath, field_index: usize, as_name: &str) -> Result<(), BuildError> {
        debug!(path = %path, field_index, as_name, "rename field");
        let stage = self.stage_mut(path)?;
        let field = field_at_mut(stage, field_index)?;
        let old_name = field.name().to_string();

        let replacement = match field {
            QueryField::Name(name) => Some(QueryField::Refined(
                RefinedField::new(name.clone()).with_alias(as_name),
            )),
            QueryField::Refined(refined) => {
                refined.as_name = Some(as_name.to_string());
                None
            }
            QueryField::Definition(def) => {
                def.set_as_name(as_name);
                None
            }
        };
        if let Some(replacement) = replacement {
            *field = replacement;
        }

        for order in stage.order_by.iter_mut().filter(|o| o.field == old_name) {
            order.field = as_name.to_string();
        }
        if let Some(by) = stage.by.as_mut().filter(|by| by.field == old_name) {
            by.field = as_name.to_string();
        }
        Ok(())
    }

    /// Replace a bare name with a copy of its definition from the root source
    pub fn replace_with_definition(&mut self, path: &StagePath, field_index: usize) -> Result<(), BuildError> {
        debug!(path = %path, field_index, "replace with definition");
        let name = match field_at(self.stage(path)?, field_index)? {
            QueryField::Name(name) => name.clone(),
            other => {
                return Err(BuildError::NotABareName {
                    field: other.name().to_string(),
                })
            }
        };
        let definition = self
            .source
            .get_field(&name)
            .cloned()
            .ok_or_else(|| BuildError::DefinitionNotFound(name.clone()))?;

        let stage = self.stage_mut(path)?;
        stage.fields[field_index] = QueryField::Definition(definition);
        Ok(())
    }

    /// Swap an inline definition for the bare name it was saved under
    pub fn replace_saved_field(&mut self, path: &StagePath, field_index: usize, name: &str) -> Result<(), BuildError> {
        debug!(path = %path, field_index, name, "replace saved field");
        let stage = self.stage_mut(path)?;
        *field_at_mut(stage, field_index)? = QueryField::Name(name.to_string());
        Ok(())
    }

    pub fn edit_field_definition(
        &mut self,
        path: &StagePath,
        field_index: usize,
        definition: FieldDef,
    ) -> Result<(), BuildError> {
        debug!(path = %path, field_index, "edit field definition");
        let stage = self.stage_mut(path)?;
        *field_at_mut(stage, field_index)? = QueryField::Definition(definition);
        Ok(())
    }

    // ========================================================================
    // Filters
    // ========================================================================

    /// Append a stage-level filter
    pub fn add_filter(&mut self, path: &StagePath, filter: FilterExpression) -> Result<(), BuildError> {
        debug!(path = %path, code = %filter.code, "add filter");
        self.stage_mut(path)?.filters.push(filter);
        Ok(())
    }

    /// Attach a filter to a field, renaming it first when `as_name` is given
    ///
    /// Only refinements hold filters: a bare name must be renamed in the
    /// same edit, and inline definitions cannot be filtered at all.
    pub fn add_filter_to_field(
        &mut self,
        path: &StagePath,
        field_index: usize,
        filter: FilterExpression,
        as_name: Option<&str>,
    ) -> Result<(), BuildError> {
        debug!(path = %path, field_index, code = %filter.code, "add filter to field");
        match (field_at(self.stage(path)?, field_index)?, as_name) {
            (QueryField::Definition(def), _) => {
                return Err(BuildError::NotRefinable {
                    field: def.display_name().to_string(),
                })
            }
            (QueryField::Name(name), None) => {
                return Err(BuildError::FilterRequiresRename { field: name.clone() })
            }
            _ => {}
        }

        if let Some(as_name) = as_name {
            self.rename_field(path, field_index, as_name)?;
        }
        let stage = self.stage_mut(path)?;
        refined_at_mut(stage, field_index)?.filters.push(filter);
        Ok(())
    }

    /// Replace a stage-level filter, or a field's filter when `field_index` is given
    pub fn edit_filter(
        &mut self,
        path: &StagePath,
        field_index: Option<usize>,
        filter_index: usize,
        filter: FilterExpression,
    ) -> Result<(), BuildError> {
        debug!(path = %path, ?field_index, filter_index, "edit filter");
        let filters = filters_at_mut(self.stage_mut(path)?, field_index)?;
        let slot = filters
            .get_mut(filter_index)
            .ok_or(BuildError::FilterNotFound { filter_index })?;
        *slot = filter;
        Ok(())
    }

    /// Remove a stage-level filter, or a field's filter when `field_index` is given
    pub fn remove_filter(
        &mut self,
        path: &StagePath,
        filter_index: usize,
        field_index: Option<usize>,
    ) -> Result<(), BuildError> {
        debug!(path = %path, ?field_index, filter_index, "remove filter");
        let filters = filters_at_mut(self.stage_mut(path)?, field_index)?;
        if filter_index >= filters.len() {
            return Err(BuildError::FilterNotFound { filter_index });
        }
        filters.remove(filter_index);
        Ok(())
    }

    // ========================================================================
    // Limit and ordering
    // ========================================================================

    pub fn has_limit(&self, path: &StagePath) -> Result<bool, BuildError> {
        Ok(self.stage(path)?.limit.is_some())
    }

    /// Set the stage's row limit
    ///
    /// With `by_field`, the ordering is replaced by that single entry, kept
    /// under the field's column name.
    pub fn add_limit(
        &mut self,
        path: &StagePath,
        limit: u64,
        by_field: Option<&str>,
        direction: Option<Direction>,
    ) -> Result<(), BuildError> {
        debug!(path = %path, limit, ?by_field, "add limit");
        let stage = self.stage_mut(path)?;
        stage.limit = Some(limit);
        if let Some(field) = by_field {
            stage.order_by = vec![OrderBy::new(last_segment(field), direction)];
            stage.by = None;
        }
        Ok(())
    }

    pub fn remove_limit(&mut self, path: &StagePath) -> Result<(), BuildError> {
        debug!(path = %path, "remove limit");
        self.stage_mut(path)?.limit = None;
        Ok(())
    }

    /// Order by the field currently at `by_field_index`
    ///
    /// The entry stores the field's visible name, not its position.
    pub fn add_order_by(
        &mut self,
        path: &StagePath,
        by_field_index: usize,
        direction: Option<Direction>,
    ) -> Result<(), BuildError> {
        debug!(path = %path, by_field_index, ?direction, "add order by");
        let stage = self.stage_mut(path)?;
        let name = field_at(stage, by_field_index)?.name().to_string();
        stage.order_by.push(OrderBy::new(name, direction));
        stage.by = None;
        Ok(())
    }

    pub fn edit_order_by(
        &mut self,
        path: &StagePath,
        order_by_index: usize,
        direction: Option<Direction>,
    ) -> Result<(), BuildError> {
        debug!(path = %path, order_by_index, ?direction, "edit order by");
        let stage = self.stage_mut(path)?;
        let order = stage
            .order_by
            .get_mut(order_by_index)
            .ok_or(BuildError::OrderByNotFound { order_by_index })?;
        order.direction = direction;
        Ok(())
    }

    pub fn remove_order_by(&mut self, path: &StagePath, order_by_index: usize) -> Result<(), BuildError> {
        debug!(path = %path, order_by_index, "remove order by");
        let stage = self.stage_mut(path)?;
        if order_by_index >= stage.order_by.len() {
            return Err(BuildError::OrderByNotFound { order_by_index });
        }
        stage.order_by.remove(order_by_index);
        Ok(())
    }

    // ========================================================================
    // Stages
    // ========================================================================

    /// Append an empty stage to the pipeline containing the stage at `path`
    ///
    /// Returns the path of the new stage.
    pub fn add_stage(&mut self, path: &StagePath) -> Result<StagePath, BuildError> {
        debug!(path = %path, "add stage");
        let pipeline = self.containing_pipeline_mut(path)?;
        if path.stage_index >= pipeline.len() {
            return Err(BuildError::StageNotFound {
                stage_index: path.stage_index,
            });
        }
        pipeline.push(Stage::default());
        Ok(StagePath {
            stage_index: pipeline.len() - 1,
            parts: path.parts.clone(),
        })
    }

    /// Remove the stage at `path`; an emptied pipeline gets one fresh stage
    pub fn remove_stage(&mut self, path: &StagePath) -> Result<(), BuildError> {
        debug!(path = %path, "remove stage");
        let pipeline = self.containing_pipeline_mut(path)?;
        if path.stage_index >= pipeline.len() {
            return Err(BuildError::StageNotFound {
                stage_index: path.stage_index,
            });
        }
        pipeline.remove(path.stage_index);
        if pipeline.is_empty() {
            pipeline.push(Stage::default());
        }
        Ok(())
    }

    /// The pipeline holding the stage at `path`: the query's own at top
    /// level, otherwise the nested query of the enclosing stage
    fn containing_pipeline_mut(&mut self, path: &StagePath) -> Result<&mut Vec<Stage>, BuildError> {
        let up = parent(path);
        match (up.path, up.field_index) {
            (Some(outer), Some(field_index)) => {
                let stage = self.stage_mut(&outer)?;
                nested_pipeline_mut(stage, field_index)
            }
            _ => Ok(&mut self.query.pipeline),
        }
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Merge a saved query from the source into the current query
    ///
    /// Stages missing from the current pipeline are copied in. Existing
    /// stages take the loaded fields first, keep their own fields whose
    /// names the loaded stage lacks, gain loaded filters not already present
    /// (by code), and take the loaded limit and ordering when set.
    pub fn load_query(&mut self, name: &str) -> Result<(), BuildError> {
        debug!(name, "load query");
        let loaded = match resolve_field(&self.source, name)? {
            FieldDef::Query(query) => query,
            _ => return Err(BuildError::NotAQuery(name.to_string())),
        };

        for (stage_index, stage) in loaded.pipeline.iter().enumerate() {
            if stage_index < self.query.pipeline.len() {
                merge_stage(&mut self.query.pipeline[stage_index], stage);
            } else {
                self.query.pipeline.push(stage.clone());
            }
        }
        self.set_name(loaded.display_name());
        Ok(())
    }
}

fn merge_stage(existing: &mut Stage, loaded: &Stage) {
    if let Some(by) = &loaded.by {
        existing.by = Some(by.clone());
        existing.order_by.clear();
    }
    for filter in &loaded.filters {
        if !existing.filters.iter().any(|f| f.code == filter.code) {
            existing.filters.push(filter.clone());
        }
    }
    if loaded.limit.is_some() {
        existing.limit = loaded.limit;
    }
    if !loaded.order_by.is_empty() {
        existing.order_by = loaded.order_by.clone();
        existing.by = None;
    }

    let kept: Vec<QueryField> = existing
        .fields
        .iter()
        .filter(|field| !loaded.fields.iter().any(|l| l.name() == field.name()))
        .cloned()
        .collect();
    existing.fields = loaded.fields.iter().cloned().chain(kept).collect();
}

// ============================================================================
// Path traversal
// ============================================================================

fn nested_pipeline(stage: &Stage, field_index: usize) -> Result<&[Stage], BuildError> {
    match stage.fields.get(field_index) {
        Some(QueryField::Definition(FieldDef::Query(query))) => Ok(&query.pipeline),
        Some(_) => Err(BuildError::NotANestedQuery { field_index }),
        None => Err(BuildError::FieldNotFound { field_index }),
    }
}

fn nested_pipeline_mut(stage: &mut Stage, field_index: usize) -> Result<&mut Vec<Stage>, BuildError> {
    match stage.fields.get_mut(field_index) {
        Some(QueryField::Definition(FieldDef::Query(query))) => Ok(&mut query.pipeline),
        Some(_) => Err(BuildError::NotANestedQuery { field_index }),
        None => Err(BuildError::FieldNotFound { field_index }),
    }
}

/// The pipeline reached by descending through `parts`
fn pipeline_at<'a>(pipeline: &'a [Stage], parts: &[StagePathPart]) -> Result<&'a [Stage], BuildError> {
    let mut current = pipeline;
    for part in parts {
        let stage = current.get(part.stage_index).ok_or(BuildError::StageNotFound {
            stage_index: part.stage_index,
        })?;
        current = nested_pipeline(stage, part.field_index)?;
    }
    Ok(current)
}

fn pipeline_at_mut<'a>(
    pipeline: &'a mut Vec<Stage>,
    parts: &[StagePathPart],
) -> Result<&'a mut Vec<Stage>, BuildError> {
    let mut current = pipeline;
    for part in parts {
        let stage = current.get_mut(part.stage_index).ok_or(BuildError::StageNotFound {
            stage_index: part.stage_index,
        })?;
        current = nested_pipeline_mut(stage, part.field_index)?;
    }
    Ok(current)
}

/// Input schema of `pipeline[stage_index]` given the pipeline's input
fn advance(source: &StructDef, pipeline: &[Stage], stage_index: usize) -> Result<StructDef, BuildError> {
    if stage_index >= pipeline.len() {
        return Err(BuildError::StageNotFound { stage_index });
    }
    Ok(transform_schema_for_pipeline(source, &pipeline[..stage_index]))
}

fn field_at(stage: &Stage, field_index: usize) -> Result<&QueryField, BuildError> {
    stage
        .fields
        .get(field_index)
        .ok_or(BuildError::FieldNotFound { field_index })
}

fn field_at_mut(stage: &mut Stage, field_index: usize) -> Result<&mut QueryField, BuildError> {
    stage
        .fields
        .get_mut(field_index)
        .ok_or(BuildError::FieldNotFound { field_index })
}

fn refined_at_mut(stage: &mut Stage, field_index: usize) -> Result<&mut RefinedField, BuildError> {
    let field = field_at_mut(stage, field_index)?;
    let name = field.name().to_string();
    field
        .as_refined_mut()
        .ok_or(BuildError::NotRefinable { field: name })
}

fn filters_at_mut(stage: &mut Stage, field_index: Option<usize>) -> Result<&mut Vec<FilterExpression>, BuildError> {
    match field_index {
        None => Ok(&mut stage.filters),
        Some(index) => Ok(&mut refined_at_mut(stage, index)?.filters),
    }
}
