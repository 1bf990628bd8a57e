// File: rusty-forms-client/src/config.rs
// Purpose: Serializable form options (endpoint, static payload, validator overrides, modes)

use crate::Payload;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Options for a single form controller
///
/// Element references and collaborators are not part of this; they go
/// through [`crate::FormControllerBuilder`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormOptions {
    /// Endpoint the payload is posted to
    #[serde(default)]
    pub url: String,

    /// Static payload; collected fields are added under `fields`
    #[serde(default)]
    pub ajax_data: Payload,

    /// Validator overrides: input type or field name to regex source
    #[serde(default)]
    pub validators: BTreeMap<String, String>,

    /// Bind to the submit trigger's click instead of the form's submit
    /// event, bypassing browser validation UI
    #[serde(default)]
    pub custom_ui: bool,

    /// Log outgoing payloads and raw responses at info level
    #[serde(default)]
    pub test_mode: bool,
}

impl FormOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.ajax_data.insert(key.into(), value.into());
        self
    }

    pub fn with_validator(mut self, key: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.validators.insert(key.into(), pattern.into());
        self
    }

    pub fn custom_ui(mut self, enabled: bool) -> Self {
        self.custom_ui = enabled;
        self
    }

    pub fn test_mode(mut self, enabled: bool) -> Self {
        self.test_mode = enabled;
        self
    }

    /// Load options from a TOML file
    ///
    /// A missing or empty file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read form options: {:?}", path))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse form options: {:?}", path))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        toml::from_str(content).context("Invalid TOML form options")
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Invalid JSON form options")
    }
}
