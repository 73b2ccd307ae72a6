//! Conversion settings

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Fallback target namespace when no target class carries one
pub const DEFAULT_TARGET_NAMESPACE: &str = "http://example.com/";

/// Settings for one conversion pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Schema `targetNamespace`; derived from the first target class when unset
    pub target_namespace: Option<String>,
    /// Prefix for the XML Schema namespace; `xsd` when the input binds it, else `xs`
    pub schema_prefix: Option<String>,
    /// Sigil marking property shapes that become attributes
    pub attribute_marker: String,
    /// Base type for textual values without a datatype
    pub default_text_type: String,
    /// Base type for bounded values without a datatype
    pub default_numeric_type: String,
    pub element_form_default: String,
    pub attribute_form_default: String,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            target_namespace: None,
            schema_prefix: None,
            attribute_marker: "@".to_string(),
            default_text_type: "string".to_string(),
            default_numeric_type: "decimal".to_string(),
            element_form_default: "qualified".to_string(),
            attribute_form_default: "unqualified".to_string(),
        }
    }
}

/// Errors loading a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConversionConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn with_target_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.target_namespace = Some(namespace.into());
        self
    }

    pub fn with_schema_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.schema_prefix = Some(prefix.into());
        self
    }
}
