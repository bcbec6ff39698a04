//! Classifier Configuration
//!
//! Runtime configuration plus its JSON file form. Configuration only ever
//! extends the built-in pattern table; it cannot remove indicators.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::ConfigError;

/// Classifier configuration
#[derive(Debug, Clone, Default)]
pub struct ClassifierConfig {
    /// Additions to the built-in pattern table
    pub patterns: PatternExtensions,
    /// Worker threads for batch classification (0 = available parallelism)
    pub batch_workers: usize,
}

impl ClassifierConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Parse configuration from JSON text
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let parsed: ClassifierConfigJson = serde_json::from_str(json)?;
        Ok(parsed.into())
    }
}

/// Extra indicators merged into the built-in pattern table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PatternExtensions {
    /// Extra regexes keyed by group name (e.g. `"admin_privilege"`)
    #[serde(default)]
    pub group_patterns: HashMap<String, Vec<String>>,
    /// Extra exact user agents treated as offensive tooling
    #[serde(default)]
    pub suspicious_agents: Vec<String>,
    /// Extra exact SQL-injection tool signatures
    #[serde(default)]
    pub sql_tool_agents: Vec<String>,
    /// Extra exact network-scanner signatures
    #[serde(default)]
    pub scanner_agents: Vec<String>,
}

impl PatternExtensions {
    pub fn is_empty(&self) -> bool {
        self.group_patterns.values().all(Vec::is_empty)
            && self.suspicious_agents.is_empty()
            && self.sql_tool_agents.is_empty()
            && self.scanner_agents.is_empty()
    }
}

/// JSON file form of [`ClassifierConfig`]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClassifierConfigJson {
    #[serde(default)]
    pub patterns: Option<PatternExtensions>,
    #[serde(default)]
    pub batch_workers: usize,
}

impl From<ClassifierConfigJson> for ClassifierConfig {
    fn from(json: ClassifierConfigJson) -> Self {
        ClassifierConfig {
            patterns: json.patterns.unwrap_or_default(),
            batch_workers: json.batch_workers,
        }
    }
}
