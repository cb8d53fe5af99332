//! Typed YAML loading

use serde::de::DeserializeOwned;
use std::path::Path;

use crate::yaml::diagnostics::{YamlError, YamlSyntaxError};

/// Deserialize `content`, naming `filename` in any diagnostic
pub fn parse_yaml<T: DeserializeOwned>(content: &str, filename: &str) -> Result<T, YamlError> {
    serde_yml::from_str(content)
        .map_err(|e| YamlSyntaxError::from_serde_error(&e, content, filename).into())
}

/// Read and deserialize a YAML file
pub fn parse_yaml_file<T: DeserializeOwned>(path: &Path) -> Result<T, YamlError> {
    let content = std::fs::read_to_string(path)?;
    parse_yaml(&content, &path.display().to_string())
}

/// Like [`parse_yaml_file`], but a missing file is `Ok(None)`
pub fn parse_optional_yaml_file<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, YamlError> {
    if !path.exists() {
        return Ok(None);
    }
    parse_yaml_file(path).map(Some)
}
