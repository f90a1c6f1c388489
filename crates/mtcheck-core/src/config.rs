//! Checker configuration.
//!
//! Loaded from a TOML file:
//!
//! ```toml
//! ignore_fields = ["name", "alias", "desc", "init"]
//!
//! [[known_issue]]
//! pattern = "^WARNING: .*: I don't know the default value of .*"
//! severity = "warning"
//! ```

use crate::diff::model::Severity;
use crate::errors::{CheckError, CheckErrorKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Machine fields that identify or describe a machine rather than define it
pub const DEFAULT_IGNORE_FIELDS: &[&str] = &["name", "alias", "desc"];

/// One accepted diagnostic pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KnownIssueEntry {
    /// Regular expression tested against the rendered diagnostic line
    pub pattern: String,
    /// When set, only diagnostics of this severity are suppressed
    #[serde(default)]
    pub severity: Option<Severity>,
}

impl KnownIssueEntry {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            severity: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckerConfig {
    pub ignore_fields: Vec<String>,
    pub known_issue: Vec<KnownIssueEntry>,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            ignore_fields: DEFAULT_IGNORE_FIELDS.iter().map(|s| s.to_string()).collect(),
            known_issue: Vec::new(),
        }
    }
}

impl CheckerConfig {
    /// Parse a TOML document; absent keys keep their defaults.
    ///
    /// # Errors
    ///
    /// `ERR_INVALID_CONFIG` when the document is not valid TOML or has
    /// unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, CheckError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file.
    ///
    /// # Errors
    ///
    /// `ERR_IO` when the file cannot be read, otherwise as
    /// [`CheckerConfig::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self, CheckError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CheckError::new(CheckErrorKind::Io)
                .with_op("load_config")
                .with_source_label(path.display().to_string())
                .with_message(e.to_string())
        })?;
        Self::from_toml_str(&text)
            .map_err(|e| e.with_op("load_config").with_source_label(path.display().to_string()))
    }

    pub fn is_ignored(&self, field: &str) -> bool {
        self.ignore_fields.iter().any(|f| f == field)
    }
}
