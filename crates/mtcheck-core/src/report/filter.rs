//! Known-issue filter.

use crate::config::KnownIssueEntry;
use crate::diff::model::{Diagnostic, Severity};
use crate::errors::{CheckError, SnapshotError};
use regex::Regex;
use std::path::Path;

#[derive(Debug, Clone)]
struct KnownIssueRule {
    regex: Regex,
    severity: Option<Severity>,
}

/// Ordered list of accepted-diagnostic predicates.
///
/// A diagnostic is suppressed when its rendered line
/// (`"<SEVERITY>: <context>: <message>"`) matches any pattern whose severity,
/// if given, equals the diagnostic's. Patterns match anywhere in the line;
/// anchor them with `^` to match from the start.
#[derive(Debug, Clone, Default)]
pub struct KnownIssueFilter {
    rules: Vec<KnownIssueRule>,
}

impl KnownIssueFilter {
    /// A filter that suppresses nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compile configured entries, keeping their order.
    ///
    /// # Errors
    ///
    /// `ERR_INVALID_PATTERN` for the first pattern that is not a valid regex.
    pub fn from_entries(entries: &[KnownIssueEntry]) -> Result<Self, CheckError> {
        let rules = entries
            .iter()
            .map(|entry| {
                Ok(KnownIssueRule {
                    regex: compile(&entry.pattern)?,
                    severity: entry.severity,
                })
            })
            .collect::<Result<Vec<_>, CheckError>>()?;
        Ok(Self { rules })
    }

    /// Parse a plain-text list: one pattern per line, `#` comments and blank
    /// lines skipped.
    ///
    /// # Errors
    ///
    /// `ERR_INVALID_PATTERN` as for [`KnownIssueFilter::from_entries`].
    pub fn from_plain_text(text: &str) -> Result<Self, CheckError> {
        let entries: Vec<KnownIssueEntry> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(KnownIssueEntry::new)
            .collect();
        Self::from_entries(&entries)
    }

    /// Read a plain-text list from disk.
    ///
    /// # Errors
    ///
    /// `ERR_IO` if the file cannot be read, otherwise as
    /// [`KnownIssueFilter::from_plain_text`].
    pub fn load_plain_text(path: &Path) -> Result<Self, CheckError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CheckError::from(e)
                .with_op("load_known_issues")
                .with_source_label(path.display().to_string())
        })?;
        Self::from_plain_text(&text)
            .map_err(|e| e.with_source_label(path.display().to_string()))
    }

    /// Append another filter's rules after this one's
    pub fn extend(&mut self, other: KnownIssueFilter) {
        self.rules.extend(other.rules);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn is_suppressed(&self, diagnostic: &Diagnostic) -> bool {
        if self.rules.is_empty() {
            return false;
        }
        let line = diagnostic.to_string();
        self.rules.iter().any(|rule| {
            rule.severity.map_or(true, |s| s == diagnostic.severity) && rule.regex.is_match(&line)
        })
    }
}

fn compile(pattern: &str) -> Result<Regex, CheckError> {
    Regex::new(pattern).map_err(|e| {
        SnapshotError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}
