//! Composer configuration

use serde::Deserialize;
use crate::summary::DataStyles;

/// Settings shared by the builder and the writer
///
/// Every key is optional in YAML; missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// Spaces per indentation level in generated query text
    pub indent_width: usize,
    /// Name given to a freshly created query
    pub default_query_name: String,
    /// Renderer overrides declared by the model (not removable by users)
    pub model_styles: DataStyles,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            indent_width: 2,
            default_query_name: "new_query".to_string(),
            model_styles: DataStyles::new(),
        }
    }
}
