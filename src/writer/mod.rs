//! Query writer (verb module)
//!
//! Derives the two outputs of a query: its source text and its summary
//! tree. Both are recomputed from scratch on every call.
//!
//! Text generation goes through an intermediate token stream
//! ([`Fragment`]) that is pretty-printed by [`render_fragments`].

mod fragment;
mod summary;
mod text;

pub use fragment::{render_fragments, Fragment};

use crate::config::ComposerConfig;
use crate::schema::{FieldKind, StructDef, TurtleDef};
use crate::summary::{DataStyles, QuerySummary, QuerySummaryItem};
use summary::SummaryContext;
use text::pipeline_fragments;

/// Serializes one query over one source
#[derive(Debug, Clone)]
pub struct QueryWriter<'a> {
    query: &'a TurtleDef,
    source: &'a StructDef,
    indent_width: usize,
    model_styles: DataStyles,
}

impl<'a> QueryWriter<'a> {
    pub fn new(query: &'a TurtleDef, source: &'a StructDef) -> Self {
        Self::with_config(query, source, &ComposerConfig::default())
    }

    pub fn with_config(query: &'a TurtleDef, source: &'a StructDef, config: &ComposerConfig) -> Self {
        Self {
            query,
            source,
            indent_width: config.indent_width,
            model_styles: config.model_styles.clone(),
        }
    }

    /// Token stream for the stand-alone form of the query
    pub fn fragments(&self) -> Vec<Fragment> {
        let header = format!("query: {} is {}", self.query.display_name(), self.source.display_name());
        let mut fragments: Vec<Fragment> = vec![header.into()];
        fragments.extend(pipeline_fragments(&self.query.pipeline, self.source, true));
        fragments
    }

    /// `query: <name> is <source> -> { ... }`
    pub fn query_text(&self) -> String {
        render_fragments(&self.fragments(), self.indent_width)
    }

    /// `<name> is { ... }`, the form used for a query declared inside a source
    pub fn query_text_for_source(&self, name: &str) -> String {
        let mut fragments: Vec<Fragment> = vec![format!("{} is", name).into()];
        fragments.extend(pipeline_fragments(&self.query.pipeline, self.source, false));
        render_fragments(&fragments, self.indent_width)
    }

    /// Summary tree of the query
    ///
    /// A renderer override registered under the query's own name shows up
    /// as a style item at the end of the last stage.
    pub fn summary(&self, model_styles: &DataStyles, styles: &DataStyles) -> QuerySummary {
        let ctx = SummaryContext {
            model_styles,
            styles,
            indent_width: self.indent_width,
        };
        let mut stages = ctx.pipeline_summaries(&self.query.pipeline, self.source, true);
        if let Some(style) = ctx.style_item(self.query.display_name(), FieldKind::Query) {
            if let Some(last) = stages.last_mut() {
                last.items.push(QuerySummaryItem::DataStyle(style));
            }
        }
        QuerySummary { stages }
    }

    /// Summary tree using the model styles from the writer's configuration
    pub fn summary_with_styles(&self, styles: &DataStyles) -> QuerySummary {
        self.summary(&self.model_styles, styles)
    }
}
