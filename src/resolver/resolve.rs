use std::borrow::Cow;
use tracing::warn;
use crate::pipeline::{QueryField, Stage};
use crate::schema::{AtomicFieldDef, FieldDef, StructDef};
use super::error::ResolveError;

/// Resolve a dotted field path against a schema
///
/// Each non-terminal segment must name a container or a query field. A
/// container is descended into directly; a query field is replaced by the
/// schema its pipeline produces when run against the current container.
///
/// # Arguments
/// * `source` - The schema to resolve against
/// * `path` - Field path such as `"aircraft.model"` or `"by_state.count"`
pub fn resolve_field(source: &StructDef, path: &str) -> Result<FieldDef, ResolveError> {
    let segments: Vec<&str> = path.split('.').collect();
    let (last, inner) = match segments.split_last() {
        Some(split) => split,
        None => return Err(ResolveError::FieldNotFound(path.to_string())),
    };

    let mut current: Cow<'_, StructDef> = Cow::Borrowed(source);
    for segment in inner {
        let next = match current.get_field(segment) {
            Some(FieldDef::Struct(inner_source)) => inner_source.clone(),
            Some(FieldDef::Query(query)) => transform_schema_for_pipeline(&current, &query.pipeline),
            Some(FieldDef::Atomic(_)) => return Err(ResolveError::NotASource(segment.to_string())),
            None => return Err(ResolveError::InnerFieldNotFound(segment.to_string())),
        };
        current = Cow::Owned(next);
    }

    current
        .get_field(last)
        .cloned()
        .ok_or_else(|| ResolveError::FieldNotFound(last.to_string()))
}

/// Resolve the definition a field reference stands for
///
/// Bare names and refinements resolve through the stage's input schema;
/// inline definitions are self-contained.
pub fn field_def_for_query_field(
    field: &QueryField,
    source: &StructDef,
) -> Result<FieldDef, ResolveError> {
    match field {
        QueryField::Name(name) => resolve_field(source, name),
        QueryField::Refined(refined) => resolve_field(source, &refined.name),
        QueryField::Definition(def) => Ok(def.clone()),
    }
}

/// Compute the schema a stage exposes to the next stage
///
/// Never fails: a stage that cannot be analyzed yields an empty
/// placeholder schema so independent resolutions further on still work.
pub fn transform_schema_for_stage(source: &StructDef, stage: &Stage) -> StructDef {
    match try_transform(source, stage) {
        Ok(output) => output,
        Err(err) => {
            warn!(source = %source.display_name(), error = %err, "stage output schema unavailable");
            StructDef::placeholder()
        }
    }
}

/// Run every stage of a pipeline in turn, starting from `source`
pub fn transform_schema_for_pipeline(source: &StructDef, pipeline: &[Stage]) -> StructDef {
    pipeline
        .iter()
        .fold(source.clone(), |current, stage| transform_schema_for_stage(&current, stage))
}

/// Each selected field becomes a plain column of the output, named by its
/// visible name; nested queries become containers holding their own output.
fn try_transform(source: &StructDef, stage: &Stage) -> Result<StructDef, ResolveError> {
    let fields = stage
        .fields
        .iter()
        .map(|field| output_field(field, source))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(StructDef::new(source.name.clone()).with_fields(fields))
}

fn output_field(field: &QueryField, source: &StructDef) -> Result<FieldDef, ResolveError> {
    let name = field.name().to_string();
    match field_def_for_query_field(field, source)? {
        FieldDef::Atomic(atomic) => Ok(FieldDef::Atomic(AtomicFieldDef::dimension(
            name,
            atomic.field_type,
        ))),
        FieldDef::Query(query) => {
            let nested = transform_schema_for_pipeline(source, &query.pipeline);
            Ok(FieldDef::Struct(StructDef::new(name).with_fields(nested.fields)))
        }
        FieldDef::Struct(_) => Err(ResolveError::UnsupportedStructField(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::RefinedField;
    use crate::schema::{FieldKind, FieldType, TurtleDef};

    fn flights() -> StructDef {
        let by_carrier = TurtleDef::new("by_carrier").with_pipeline(vec![
            Stage::default().with_fields(vec!["carrier".into(), "count".into()]),
        ]);
        StructDef::new("flights").with_fields(vec![
            AtomicFieldDef::dimension("state", FieldType::String).into(),
            AtomicFieldDef::dimension("carrier", FieldType::String).into(),
            AtomicFieldDef::measure("count", FieldType::Number).with_code("count()").into(),
            StructDef::new("aircraft")
                .with_fields(vec![AtomicFieldDef::dimension("model", FieldType::String).into()])
                .into(),
            by_carrier.into(),
        ])
    }

    // -- unit: resolve_field --------------------------------------------------

    #[test]
    fn test_resolve_top_level_field() {
        let field = resolve_field(&flights(), "state").unwrap();
        assert_eq!(field.kind(), FieldKind::Dimension);
    }

    #[test]
    fn test_resolve_through_container() {
        let field = resolve_field(&flights(), "aircraft.model").unwrap();
        assert_eq!(field.name(), "model");
    }

    #[test]
    fn test_resolve_through_query_field() {
        // The nest's output turns the measure into a plain column
        let field = resolve_field(&flights(), "by_carrier.count").unwrap();
        assert_eq!(field.kind(), FieldKind::Dimension);
        assert_eq!(field.as_atomic().unwrap().field_type, FieldType::Number);
    }

    #[test]
    fn test_resolve_missing_field() {
        let err = resolve_field(&flights(), "origin").unwrap_err();
        assert_eq!(err, ResolveError::FieldNotFound("origin".into()));
        assert_eq!(err.to_string(), "Could not find origin");
    }

    #[test]
    fn test_resolve_missing_inner_segment() {
        let err = resolve_field(&flights(), "engine.type").unwrap_err();
        assert_eq!(err, ResolveError::InnerFieldNotFound("engine".into()));
    }

    #[test]
    fn test_resolve_through_leaf_fails() {
        let err = resolve_field(&flights(), "state.name").unwrap_err();
        assert_eq!(err, ResolveError::NotASource("state".into()));
    }

    // -- unit: transform_schema_for_stage -------------------------------------

    #[test]
    fn test_transform_renames_and_flattens() {
        let stage = Stage::default().with_fields(vec![
            "state".into(),
            RefinedField::new("count").with_alias("flight_count").into(),
        ]);
        let output = transform_schema_for_stage(&flights(), &stage);

        assert_eq!(output.fields.len(), 2);
        assert!(output.get_field("state").is_some());
        let renamed = output.get_field("flight_count").unwrap();
        assert_eq!(renamed.kind(), FieldKind::Dimension);
    }

    #[test]
    fn test_transform_nest_becomes_container() {
        let stage = Stage::default().with_fields(vec!["state".into(), "by_carrier".into()]);
        let output = transform_schema_for_stage(&flights(), &stage);

        match output.get_field("by_carrier") {
            Some(FieldDef::Struct(nested)) => {
                assert!(nested.get_field("carrier").is_some());
                assert!(nested.get_field("count").is_some());
            }
            other => panic!("expected container, got {:?}", other),
        }
    }

    #[test]
    fn test_transform_degrades_to_placeholder() {
        let stage = Stage::default().with_fields(vec!["state".into(), "missing".into()]);
        let output = transform_schema_for_stage(&flights(), &stage);
        assert_eq!(output, StructDef::placeholder());
        assert!(output.fields.is_empty());
    }

    #[test]
    fn test_transform_pipeline_chains_stages() {
        let pipeline = vec![
            Stage::default().with_fields(vec!["state".into(), "count".into()]),
            Stage::default().with_fields(vec!["count".into()]),
        ];
        let output = transform_schema_for_pipeline(&flights(), &pipeline);
        assert_eq!(output.fields.len(), 1);
        assert_eq!(output.fields[0].name(), "count");
    }

    #[test]
    fn test_dotted_reference_becomes_last_segment_column() {
        let stage = Stage::default().with_fields(vec![
            "aircraft.model".into(),
            RefinedField::new("aircraft.model").with_alias("plane").into(),
        ]);
        let output = transform_schema_for_stage(&flights(), &stage);
        let names: Vec<&str> = output.fields.iter().map(FieldDef::name).collect();
        assert_eq!(names, vec!["model", "plane"]);

        // The next stage reaches the column by that name
        let field = resolve_field(&output, "model").unwrap();
        assert_eq!(field.kind(), FieldKind::Dimension);
    }
}
