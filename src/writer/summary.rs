//! Query summary projection

use tracing::warn;
use crate::pipeline::{FilterExpression, QueryField, RefinedField, Stage};
use crate::resolver::{field_def_for_query_field, transform_schema_for_stage, ResolveError};
use crate::schema::{AtomicFieldDef, FieldDef, FieldKind, StructDef};
use crate::summary::{
    allowed_renderers, DataStyleItem, DataStyles, ErrorFieldItem, FieldDefinitionItem, FieldItem,
    FilterItem, LimitItem, NestedQueryItem, OrderByField, OrderByItem, QuerySummaryItem,
    StageSummary,
};
use super::fragment::render_fragments;
use super::text::refinement_fragments;

/// Inputs shared by every stage of one summary computation
pub(crate) struct SummaryContext<'a> {
    pub model_styles: &'a DataStyles,
    pub styles: &'a DataStyles,
    pub indent_width: usize,
}

impl SummaryContext<'_> {
    /// Summaries for each stage of a pipeline
    ///
    /// `at_root` is true when the pipeline's first stage reads the root
    /// source directly; only fields of such a stage offer a saved definition.
    pub fn pipeline_summaries(&self, pipeline: &[Stage], source: &StructDef, at_root: bool) -> Vec<StageSummary> {
        let mut summaries = Vec::with_capacity(pipeline.len());
        let mut stage_source = source.clone();
        for (index, stage) in pipeline.iter().enumerate() {
            summaries.push(self.stage_summary(stage, &stage_source, at_root && index == 0));
            stage_source = transform_schema_for_stage(&stage_source, stage);
        }
        summaries
    }

    fn stage_summary(&self, stage: &Stage, source: &StructDef, at_root: bool) -> StageSummary {
        let mut items: Vec<QuerySummaryItem> = filter_items(&stage.filters)
            .into_iter()
            .map(QuerySummaryItem::Filter)
            .collect();
        let mut order_by_fields = Vec::new();

        for (field_index, field) in stage.fields.iter().enumerate() {
            match self.field_item(field, field_index, source, at_root, &mut order_by_fields) {
                Ok(item) => items.push(item),
                Err(err) => {
                    warn!(field = field.path(), error = %err, "field shown as error in summary");
                    items.push(QuerySummaryItem::ErrorField(ErrorFieldItem {
                        field: field.clone(),
                        name: field.name().to_string(),
                        error: err.to_string(),
                        field_index,
                    }));
                }
            }
        }

        if let Some(limit) = stage.limit {
            items.push(QuerySummaryItem::Limit(LimitItem { limit }));
        }

        for (order_by_index, order) in stage.order_by.iter().enumerate() {
            match order_by_target(stage, &order.field, source) {
                Some(by_field) => items.push(QuerySummaryItem::OrderBy(OrderByItem {
                    by_field,
                    direction: order.direction,
                    order_by_index,
                })),
                None => warn!(field = %order.field, "ordering target not found; omitted from summary"),
            }
        }

        StageSummary {
            items,
            order_by_fields,
            input_source: source.clone(),
        }
    }

    fn field_item(
        &self,
        field: &QueryField,
        field_index: usize,
        source: &StructDef,
        at_root: bool,
        order_by_fields: &mut Vec<OrderByField>,
    ) -> Result<QuerySummaryItem, ResolveError> {
        let def = field_def_for_query_field(field, source)?;
        if let FieldDef::Struct(inner) = &def {
            return Err(ResolveError::UnsupportedStructField(inner.display_name().to_string()));
        }
        let kind = def.kind();
        let style = self.style_item(field.name(), kind);

        if let Some(atomic) = def.as_atomic() {
            order_by_fields.push(OrderByField {
                name: field.name().to_string(),
                field_index,
                field_type: atomic.field_type,
            });
        }

        let item = match field {
            QueryField::Name(name) => QuerySummaryItem::Field(FieldItem {
                name: def.display_name().to_string(),
                field: def,
                field_index,
                path: name.clone(),
                kind,
                is_refined: false,
                is_renamed: false,
                filters: Vec::new(),
                styles: style.into_iter().filter(|s| s.can_remove).collect(),
                save_definition: None,
            }),
            QueryField::Refined(refined) => QuerySummaryItem::Field(FieldItem {
                save_definition: match def.as_atomic() {
                    Some(atomic) if at_root => Some(self.refinement_definition(refined, atomic)),
                    _ => None,
                },
                field: def,
                field_index,
                name: refined.display_name().to_string(),
                path: refined.name.clone(),
                kind,
                is_refined: true,
                is_renamed: refined.as_name.is_some(),
                filters: filter_items(&refined.filters),
                styles: style.into_iter().filter(|s| s.can_remove).collect(),
            }),
            QueryField::Definition(FieldDef::Query(query)) => {
                QuerySummaryItem::NestedQueryDefinition(NestedQueryItem {
                    name: query.display_name().to_string(),
                    field_index,
                    stages: self.pipeline_summaries(&query.pipeline, source, at_root),
                    styles: style.into_iter().collect(),
                    save_definition: at_root.then(|| def.clone()),
                })
            }
            QueryField::Definition(inline) => QuerySummaryItem::FieldDefinition(FieldDefinitionItem {
                name: inline.display_name().to_string(),
                source: inline.as_atomic().and_then(|atomic| atomic.code.clone()),
                field: def.clone(),
                field_index,
                kind,
                styles: style.into_iter().collect(),
                save_definition: at_root.then(|| def.clone()),
            }),
        };
        Ok(item)
    }

    /// The renderer override in effect for `name`
    ///
    /// User styles take precedence over model styles; only user styles can
    /// be removed.
    pub fn style_item(&self, name: &str, kind: FieldKind) -> Option<DataStyleItem> {
        let style = self.styles.get(name).or_else(|| self.model_styles.get(name))?;
        Some(DataStyleItem {
            renderer: style.renderer?,
            style_key: name.to_string(),
            can_remove: self.styles.contains_key(name),
            allowed_renderers: allowed_renderers(kind),
        })
    }

    /// Rewrite a refinement as a stand-alone definition under its visible name
    fn refinement_definition(&self, refined: &RefinedField, def: &AtomicFieldDef) -> FieldDef {
        let code = render_fragments(&refinement_fragments(&refined.name, &refined.filters), self.indent_width);
        FieldDef::Atomic(AtomicFieldDef {
            name: refined.display_name().to_string(),
            as_name: None,
            field_type: def.field_type,
            aggregate: def.aggregate,
            code: Some(code),
        })
    }
}

fn filter_items(filters: &[FilterExpression]) -> Vec<FilterItem> {
    filters
        .iter()
        .enumerate()
        .map(|(filter_index, filter)| FilterItem {
            filter_source: filter.code.clone(),
            filter_index,
        })
        .collect()
}

/// The atomic field an ordering entry names, as it currently resolves
fn order_by_target(stage: &Stage, name: &str, source: &StructDef) -> Option<OrderByField> {
    let field_index = stage.position_of(name)?;
    let field = &stage.fields[field_index];
    let def = field_def_for_query_field(field, source).ok()?;
    let atomic = def.as_atomic()?;
    Some(OrderByField {
        name: field.name().to_string(),
        field_index,
        field_type: atomic.field_type,
    })
}
