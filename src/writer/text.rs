//! Query text generation
//!
//! Produces the token stream for a pipeline. Each stage is a brace block:
//!
//! ```text
//! {
//!   where: <filter>
//!   group_by: <dimensions>
//!   aggregate: <measures>
//!   nest: <nested queries>
//!   limit: <n>
//!   order_by: <name> [asc|desc], ...
//! }
//! ```

use tracing::warn;
use crate::pipeline::{last_segment, FilterExpression, QueryField, RefinedField, Stage};
use crate::resolver::{field_def_for_query_field, transform_schema_for_stage, ResolveError};
use crate::schema::{FieldDef, StructDef};
use super::fragment::Fragment;

/// Clause a field is written under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Property {
    GroupBy,
    Aggregate,
    Nest,
}

impl Property {
    const ALL: [Property; 3] = [Property::GroupBy, Property::Aggregate, Property::Nest];

    fn keyword(self) -> &'static str {
        match self {
            Property::GroupBy => "group_by",
            Property::Aggregate => "aggregate",
            Property::Nest => "nest",
        }
    }

    fn of(def: &FieldDef) -> Result<Property, ResolveError> {
        match def {
            FieldDef::Atomic(atomic) if atomic.aggregate => Ok(Property::Aggregate),
            FieldDef::Atomic(_) => Ok(Property::GroupBy),
            FieldDef::Query(_) => Ok(Property::Nest),
            FieldDef::Struct(source) => {
                Err(ResolveError::UnsupportedStructField(source.display_name().to_string()))
            }
        }
    }
}

/// Tokens for a chain of stages, each preceded by `" ->"` except the first
/// when `arrow_first` is false
pub(crate) fn pipeline_fragments(pipeline: &[Stage], source: &StructDef, arrow_first: bool) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    let mut stage_source = source.clone();
    for (index, stage) in pipeline.iter().enumerate() {
        if index > 0 || arrow_first {
            fragments.push(" ->".into());
        }
        fragments.extend(stage_fragments(stage, &stage_source));
        stage_source = transform_schema_for_stage(&stage_source, stage);
    }
    fragments
}

/// Tokens for one stage block, starting with `" {"`
///
/// Fields that fail to resolve are left out; the rest of the stage is
/// still written.
pub(crate) fn stage_fragments(stage: &Stage, source: &StructDef) -> Vec<Fragment> {
    let mut fragments: Vec<Fragment> = vec![" {".into(), Fragment::Newline, Fragment::Indent];

    if !stage.filters.is_empty() {
        fragments.push("where:".into());
        fragments.extend(filter_fragments(&stage.filters));
    }

    let mut groups: [Vec<Vec<Fragment>>; 3] = Default::default();
    for field in &stage.fields {
        match field_fragments(field, source) {
            Ok((property, code)) => groups[property as usize].push(code),
            Err(err) => warn!(field = field.path(), error = %err, "leaving unresolvable field out of query text"),
        }
    }
    for (property, group) in Property::ALL.iter().zip(groups.iter()) {
        fragments.extend(property_fragments(*property, group));
    }

    if let Some(limit) = stage.limit {
        fragments.push(format!("limit: {}", limit).into());
        fragments.push(Fragment::Newline);
    }

    if !stage.order_by.is_empty() {
        let terms: Vec<String> = stage
            .order_by
            .iter()
            .map(|order| {
                let name = last_segment(&order.field);
                match order.direction {
                    Some(direction) => format!("{} {}", name, direction),
                    None => name.to_string(),
                }
            })
            .collect();
        fragments.push(format!("order_by: {}", terms.join(", ")).into());
        fragments.push(Fragment::Newline);
    } else if let Some(by) = &stage.by {
        fragments.push(format!("order_by: {} desc", last_segment(&by.field)).into());
        fragments.push(Fragment::Newline);
    }

    fragments.push(Fragment::Outdent);
    fragments.push("}".into());
    fragments
}

/// A single filter goes on the `where:` line; several go one per line
pub(crate) fn filter_fragments(filters: &[FilterExpression]) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    if filters.len() == 1 {
        fragments.push(" ".into());
    } else {
        fragments.push(Fragment::Newline);
        fragments.push(Fragment::Indent);
    }
    for (index, filter) in filters.iter().enumerate() {
        fragments.push(filter.code.as_str().into());
        if index + 1 < filters.len() {
            fragments.push(",".into());
        }
        fragments.push(Fragment::Newline);
    }
    if filters.len() > 1 {
        fragments.push(Fragment::Outdent);
    }
    fragments
}

/// `name { where: ... }`, or just `name` without filters
pub(crate) fn refinement_fragments(name: &str, filters: &[FilterExpression]) -> Vec<Fragment> {
    let mut fragments: Vec<Fragment> = vec![name.into()];
    if !filters.is_empty() {
        fragments.extend([" {".into(), Fragment::Newline, Fragment::Indent, "where:".into()]);
        fragments.extend(filter_fragments(filters));
        fragments.extend([Fragment::Outdent, "}".into()]);
    }
    fragments
}

fn field_fragments(field: &QueryField, source: &StructDef) -> Result<(Property, Vec<Fragment>), ResolveError> {
    match field {
        QueryField::Name(name) => {
            let property = Property::of(&field_def_for_query_field(field, source)?)?;
            Ok((property, vec![name.as_str().into()]))
        }
        QueryField::Refined(refined) => {
            let property = Property::of(&field_def_for_query_field(field, source)?)?;
            Ok((property, refined_fragments(refined)))
        }
        QueryField::Definition(FieldDef::Query(query)) => {
            let mut fragments: Vec<Fragment> = vec![format!("{} is", query.display_name()).into()];
            fragments.extend(pipeline_fragments(&query.pipeline, source, false));
            Ok((Property::Nest, fragments))
        }
        QueryField::Definition(def) => {
            let property = Property::of(def)?;
            let code = match def.as_atomic().and_then(|atomic| atomic.code.as_deref()) {
                Some(code) => format!("{} is {}", def.display_name(), code),
                None => def.display_name().to_string(),
            };
            Ok((property, vec![code.into()]))
        }
    }
}

fn refined_fragments(refined: &RefinedField) -> Vec<Fragment> {
    match &refined.as_name {
        Some(as_name) => {
            let mut fragments: Vec<Fragment> = vec![format!("{} is ", as_name).into()];
            fragments.extend(refinement_fragments(&refined.name, &refined.filters));
            fragments
        }
        None => refinement_fragments(&refined.name, &refined.filters),
    }
}

/// One item stays on the keyword line; several become an indented block
fn property_fragments(property: Property, items: &[Vec<Fragment>]) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    match items {
        [] => {}
        [single] => {
            fragments.push(format!("{}: ", property.keyword()).into());
            fragments.extend(single.iter().cloned());
            fragments.push(Fragment::Newline);
        }
        _ => {
            fragments.push(format!("{}:", property.keyword()).into());
            fragments.push(Fragment::Newline);
            fragments.push(Fragment::Indent);
            for item in items {
                fragments.extend(item.iter().cloned());
                fragments.push(Fragment::Newline);
            }
            fragments.push(Fragment::Outdent);
        }
    }
    fragments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Direction, OrderBy, TopBy};
    use crate::schema::{AtomicFieldDef, FieldType, TurtleDef};
    use crate::writer::fragment::render_fragments;

    fn flights() -> StructDef {
        StructDef::new("flights").with_fields(vec![
            AtomicFieldDef::dimension("state", FieldType::String).into(),
            AtomicFieldDef::dimension("carrier", FieldType::String).into(),
            AtomicFieldDef::measure("count", FieldType::Number).with_code("count()").into(),
            StructDef::new("aircraft")
                .with_fields(vec![AtomicFieldDef::dimension("model", FieldType::String).into()])
                .into(),
        ])
    }

    fn render(stage: &Stage) -> String {
        render_fragments(&stage_fragments(stage, &flights()), 2)
    }

    // -- unit: grouping -------------------------------------------------------

    #[test]
    fn test_groups_in_fixed_order() {
        let stage = Stage::default().with_fields(vec!["count".into(), "state".into()]);
        assert_eq!(render(&stage), " {\n  group_by: state\n  aggregate: count\n}");
    }

    #[test]
    fn test_multi_item_group_is_block() {
        let stage = Stage::default().with_fields(vec!["state".into(), "carrier".into()]);
        assert_eq!(render(&stage), " {\n  group_by:\n    state\n    carrier\n}");
    }

    #[test]
    fn test_group_preserves_relative_order() {
        let stage = Stage::default().with_fields(vec![
            "carrier".into(),
            "count".into(),
            "state".into(),
        ]);
        let text = render(&stage);
        assert!(text.find("carrier").unwrap() < text.find("state").unwrap());
        assert!(text.find("state").unwrap() < text.find("aggregate").unwrap());
    }

    #[test]
    fn test_unresolvable_field_is_skipped() {
        let stage = Stage::default().with_fields(vec!["state".into(), "missing".into()]);
        assert_eq!(render(&stage), " {\n  group_by: state\n}");
    }

    #[test]
    fn test_container_field_is_skipped() {
        let stage = Stage::default().with_fields(vec!["aircraft".into(), "aircraft.model".into()]);
        assert_eq!(render(&stage), " {\n  group_by: aircraft.model\n}");
    }

    // -- unit: clauses --------------------------------------------------------

    #[test]
    fn test_single_filter_inline() {
        let stage = Stage {
            filters: vec![FilterExpression::new("state = 'CA'")],
            ..Default::default()
        };
        assert_eq!(render(&stage), " {\n  where: state = 'CA'\n}");
    }

    #[test]
    fn test_multiple_filters_one_per_line() {
        let stage = Stage {
            filters: vec![FilterExpression::new("a > 1"), FilterExpression::new("b < 2")],
            ..Default::default()
        };
        assert_eq!(render(&stage), " {\n  where:\n    a > 1,\n    b < 2\n}");
    }

    #[test]
    fn test_limit_and_order_by() {
        let stage = Stage {
            fields: vec!["state".into()],
            limit: Some(10),
            order_by: vec![
                OrderBy::new("state", Some(Direction::Asc)),
                OrderBy::new("by_carrier.count", None),
            ],
            ..Default::default()
        };
        assert_eq!(
            render(&stage),
            " {\n  group_by: state\n  limit: 10\n  order_by: state asc, count\n}"
        );
    }

    #[test]
    fn test_top_by_shorthand() {
        let stage = Stage {
            fields: vec!["count".into()],
            by: Some(TopBy { field: "count".into() }),
            ..Default::default()
        };
        assert_eq!(render(&stage), " {\n  aggregate: count\n  order_by: count desc\n}");
    }

    // -- unit: field variants -------------------------------------------------

    #[test]
    fn test_refined_field() {
        let refined = RefinedField::new("count")
            .with_alias("ca_count")
            .with_filters(vec![FilterExpression::new("state = 'CA'")]);
        let stage = Stage::default().with_fields(vec![refined.into()]);
        assert_eq!(
            render(&stage),
            " {\n  aggregate: ca_count is count {\n    where: state = 'CA'\n  }\n}"
        );
    }

    #[test]
    fn test_inline_definition() {
        let def = AtomicFieldDef::measure("avg_distance", FieldType::Number).with_code("avg(distance)");
        let stage = Stage::default().with_fields(vec![FieldDef::from(def).into()]);
        assert_eq!(render(&stage), " {\n  aggregate: avg_distance is avg(distance)\n}");
    }

    #[test]
    fn test_nested_query_recurses() {
        let nested = TurtleDef::new("by_carrier").with_pipeline(vec![
            Stage::default().with_fields(vec!["carrier".into()]),
            Stage::default().with_fields(vec!["carrier".into()]),
        ]);
        let stage = Stage::default().with_fields(vec![FieldDef::from(nested).into()]);
        assert_eq!(
            render(&stage),
            " {\n  nest: by_carrier is {\n    group_by: carrier\n  } -> {\n    group_by: carrier\n  }\n}"
        );
    }

    #[test]
    fn test_refinement_code() {
        let fragments = refinement_fragments("count", &[FilterExpression::new("x")]);
        assert_eq!(render_fragments(&fragments, 2), "count {\n  where: x\n}");
        assert_eq!(render_fragments(&refinement_fragments("count", &[]), 2), "count");
    }
}
