//! Shared test utilities for integration tests

#![allow(dead_code)]

use querycraft::compiler::{CompileError, FragmentCompiler};
use querycraft::resolver::{resolve_field, transform_schema_for_stage};
use querycraft::{
    parser, AtomicFieldDef, Direction, FieldDef, FieldType, FilterExpression, OrderBy, QueryField,
    RefinedField, Stage, StructDef, TurtleDef,
};

/// Load a test fixture from the tests/test_data directory
pub fn load_fixture(name: &str) -> StructDef {
    init_logging();
    let path = format!("tests/test_data/{}", name);
    parser::parse_file(&path)
        .unwrap_or_else(|e| panic!("Failed to load test data {}: {}", name, e))
}

/// Route library logs to the test output; `RUST_LOG=querycraft=debug` shows edits
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Visible field names of a stage, sorted
pub fn field_names(stage: &Stage) -> Vec<String> {
    let mut names: Vec<String> = stage.fields.iter().map(|f| f.name().to_string()).collect();
    names.sort();
    names
}

// ============================================================================
// Mock compiler
// ============================================================================

/// Compiler stand-in that understands exactly the text `QueryWriter` emits
///
/// Inline expressions are not type-checked: dimensions come back as
/// strings, measures as numbers.
pub struct MockCompiler;

impl FragmentCompiler for MockCompiler {
    fn compile_filter(&self, _source: &StructDef, code: &str) -> Result<FilterExpression, CompileError> {
        if code.trim().is_empty() {
            return Err(CompileError::new("empty filter"));
        }
        Ok(FilterExpression::new(code.trim()))
    }

    fn compile_dimension(&self, _source: &StructDef, name: &str, code: &str) -> Result<FieldDef, CompileError> {
        if code.trim().is_empty() {
            return Err(CompileError::new("empty expression"));
        }
        Ok(AtomicFieldDef::dimension(name, FieldType::String).with_code(code.trim()).into())
    }

    fn compile_measure(&self, _source: &StructDef, name: &str, code: &str) -> Result<FieldDef, CompileError> {
        if !code.contains('(') {
            return Err(CompileError::new(format!("'{}' is not an aggregate", code)));
        }
        Ok(AtomicFieldDef::measure(name, FieldType::Number).with_code(code.trim()).into())
    }

    fn compile_query(&self, source: &StructDef, text: &str) -> Result<TurtleDef, CompileError> {
        let mut lines = Lines::new(text);
        let header = lines.next()?;
        let rest = header
            .strip_prefix("query: ")
            .ok_or_else(|| lines.error("expected 'query:'"))?;
        let (name, rest) = rest.split_once(" is ").ok_or_else(|| lines.error("expected 'is'"))?;
        if !rest.ends_with("-> {") {
            return Err(lines.error("expected '-> {'"));
        }
        let pipeline = parse_pipeline(&mut lines, source)?;
        Ok(TurtleDef::new(name).with_pipeline(pipeline))
    }
}

struct Lines {
    lines: Vec<String>,
    pos: usize,
}

impl Lines {
    fn new(text: &str) -> Self {
        Self {
            lines: text.lines().map(|l| l.trim().to_string()).filter(|l| !l.is_empty()).collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<&str> {
        self.lines.get(self.pos).map(String::as_str)
    }

    fn next(&mut self) -> Result<String, CompileError> {
        let line = self
            .lines
            .get(self.pos)
            .cloned()
            .ok_or_else(|| CompileError::new("unexpected end of text"))?;
        self.pos += 1;
        Ok(line)
    }

    fn error(&self, message: &str) -> CompileError {
        CompileError::new(message).at_line(self.pos)
    }
}

const CLAUSES: [&str; 6] = ["where:", "group_by:", "aggregate:", "nest:", "limit:", "order_by:"];

/// Stages up to and including the closing `}` of the last one
fn parse_pipeline(lines: &mut Lines, source: &StructDef) -> Result<Vec<Stage>, CompileError> {
    let mut pipeline = Vec::new();
    let mut stage_source = source.clone();
    loop {
        let stage = parse_stage(lines, &stage_source)?;
        stage_source = transform_schema_for_stage(&stage_source, &stage);
        pipeline.push(stage);
        match lines.next()?.as_str() {
            "}" => return Ok(pipeline),
            "} -> {" => continue,
            _ => return Err(lines.error("expected end of stage")),
        }
    }
}

fn parse_stage(lines: &mut Lines, source: &StructDef) -> Result<Stage, CompileError> {
    let mut stage = Stage::default();
    while let Some(line) = lines.peek() {
        if line.starts_with('}') {
            break;
        }
        let line = lines.next()?;
        if let Some(rest) = line.strip_prefix("where:") {
            stage.filters = parse_filters(lines, rest)?;
        } else if let Some(rest) = line.strip_prefix("limit: ") {
            stage.limit = Some(rest.parse().map_err(|_| lines.error("bad limit"))?);
        } else if let Some(rest) = line.strip_prefix("order_by: ") {
            stage.order_by = rest.split(", ").map(parse_order).collect();
        } else {
            let (_, rest) = line.split_once(':').ok_or_else(|| lines.error("expected clause"))?;
            let rest = rest.trim();
            if rest.is_empty() {
                while let Some(item) = lines.peek() {
                    if item.starts_with('}') || CLAUSES.iter().any(|c| item.starts_with(c)) {
                        break;
                    }
                    let item = lines.next()?;
                    stage.fields.push(parse_item(lines, &item, source)?);
                }
            } else {
                stage.fields.push(parse_item(lines, rest, source)?);
            }
        }
    }
    Ok(stage)
}

fn parse_filters(lines: &mut Lines, rest: &str) -> Result<Vec<FilterExpression>, CompileError> {
    let rest = rest.trim();
    if !rest.is_empty() {
        return Ok(vec![FilterExpression::new(rest)]);
    }
    let mut filters = Vec::new();
    loop {
        let line = lines.next()?;
        match line.strip_suffix(',') {
            Some(code) => filters.push(FilterExpression::new(code)),
            None => {
                filters.push(FilterExpression::new(line));
                return Ok(filters);
            }
        }
    }
}

fn parse_order(term: &str) -> OrderBy {
    match term.rsplit_once(' ') {
        Some((name, "asc")) => OrderBy::new(name, Some(Direction::Asc)),
        Some((name, "desc")) => OrderBy::new(name, Some(Direction::Desc)),
        _ => OrderBy::new(term, None),
    }
}

fn parse_item(lines: &mut Lines, text: &str, source: &StructDef) -> Result<QueryField, CompileError> {
    if let Some(name) = text.strip_suffix(" is {") {
        let pipeline = parse_pipeline(lines, source)?;
        return Ok(FieldDef::Query(TurtleDef::new(name).with_pipeline(pipeline)).into());
    }

    let (head, filters) = match text.strip_suffix(" {") {
        Some(head) => {
            let line = lines.next()?;
            let rest = line.strip_prefix("where:").ok_or_else(|| lines.error("expected 'where:'"))?;
            let filters = parse_filters(lines, rest)?;
            if lines.next()? != "}" {
                return Err(lines.error("expected '}'"));
            }
            (head, filters)
        }
        None => (text, Vec::new()),
    };

    match head.split_once(" is ") {
        Some((alias, target)) if resolve_field(source, target).is_ok() => {
            Ok(RefinedField::new(target).with_alias(alias).with_filters(filters).into())
        }
        Some((name, code)) => {
            let def = if code.contains('(') {
                AtomicFieldDef::measure(name, FieldType::Number)
            } else {
                AtomicFieldDef::dimension(name, FieldType::String)
            };
            Ok(FieldDef::from(def.with_code(code)).into())
        }
        None if filters.is_empty() => Ok(QueryField::Name(head.to_string())),
        None => Ok(RefinedField::new(head).with_filters(filters).into()),
    }
}
