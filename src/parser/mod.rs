//! Schema and configuration parser (verb module)
//!
//! Transforms YAML documents into source schemas and composer settings.

use std::path::Path;
use crate::config::ComposerConfig;
use crate::error::ParseError;
use crate::schema::StructDef;

/// Parse a source schema from a YAML file
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<StructDef, ParseError> {
    parse_str(&read(path)?)
}

/// Parse a source schema from a YAML string
pub fn parse_str(yaml: &str) -> Result<StructDef, ParseError> {
    serde_yaml::from_str(yaml).map_err(ParseError::from)
}

/// Parse composer settings from a YAML file
pub fn parse_config_file<P: AsRef<Path>>(path: P) -> Result<ComposerConfig, ParseError> {
    parse_config_str(&read(path)?)
}

/// Parse composer settings from a YAML string
pub fn parse_config_str(yaml: &str) -> Result<ComposerConfig, ParseError> {
    serde_yaml::from_str(yaml).map_err(ParseError::from)
}

fn read<P: AsRef<Path>>(path: P) -> Result<String, ParseError> {
    let path_str = path.as_ref().display().to_string();
    std::fs::read_to_string(&path).map_err(|e| ParseError::Io {
        path: path_str,
        source: e,
    })
}
