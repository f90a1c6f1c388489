//! Diagnostic types.
//!
//! A diagnostic is immutable once created. `Error` marks a concrete
//! behavioral difference between builds; `Warning` marks a case the checker
//! cannot judge (schema drift, missing introspection data, redundancy).

use crate::resolve::PropKey;
use mtcheck_core_types::{MachineName, SnapshotRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    /// Upper-case label used in rendered lines
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which snapshot(s) a diagnostic is about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scope {
    /// Found while resolving one snapshot on its own
    Snapshot { snapshot: SnapshotRef },
    /// Found while comparing an earlier snapshot with a later one
    Pair {
        older: SnapshotRef,
        newer: SnapshotRef,
    },
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Snapshot { snapshot } => write!(f, "{}", snapshot),
            Scope::Pair { older, newer } => write!(f, "{} vs {}", older, newer),
        }
    }
}

/// What a diagnostic is about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Subject {
    MachineField { field: String },
    Property { device: String, property: String },
}

impl Subject {
    pub fn property(key: &PropKey) -> Self {
        Subject::Property {
            device: key.device.clone(),
            property: key.property.clone(),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::MachineField { field } => write!(f, "machine.{}", field),
            Subject::Property { device, property } => write!(f, "{}.{}", device, property),
        }
    }
}

/// One finding of a checking run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub scope: Scope,
    pub machine: MachineName,
    pub subject: Subject,
    pub message: String,
}

impl Diagnostic {
    pub fn error(scope: Scope, machine: &MachineName, subject: Subject, message: String) -> Self {
        Self {
            severity: Severity::Error,
            scope,
            machine: machine.clone(),
            subject,
            message,
        }
    }

    pub fn warning(scope: Scope, machine: &MachineName, subject: Subject, message: String) -> Self {
        Self {
            severity: Severity::Warning,
            scope,
            machine: machine.clone(),
            subject,
            message,
        }
    }

    /// `"<snapshots>: <machine>"`
    pub fn context(&self) -> String {
        format!("{}: {}", self.scope, self.machine)
    }

    /// Snapshots this diagnostic refers to, oldest first
    pub fn snapshots(&self) -> Vec<&SnapshotRef> {
        match &self.scope {
            Scope::Snapshot { snapshot } => vec![snapshot],
            Scope::Pair { older, newer } => vec![older, newer],
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    /// `"<SEVERITY>: <context>: <message>"`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.context(), self.message)
    }
}
