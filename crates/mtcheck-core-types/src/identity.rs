//! Identity types for snapshots and machine types
//!
//! A run loads an ordered list of snapshots, one per emulator build. Every
//! diagnostic names the snapshot(s) it came from through a [`SnapshotRef`],
//! which carries the position in that list plus the operator-facing label
//! (usually the dump path or the emulator binary).

use serde::{Deserialize, Serialize};

/// Position and label of one snapshot in the ordered input list
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SnapshotRef {
    index: usize,
    label: String,
}

impl SnapshotRef {
    /// Create a reference for the snapshot at `index` (0 = oldest build)
    pub fn new(index: usize, label: impl Into<String>) -> Self {
        Self {
            index,
            label: label.into(),
        }
    }

    /// Position in the ordered snapshot list
    pub fn index(&self) -> usize {
        self.index
    }

    /// Operator-facing label
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl std::fmt::Display for SnapshotRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Name of a machine type (e.g. `pc-i440fx-2.8`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MachineName(String);

impl MachineName {
    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MachineName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for MachineName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
