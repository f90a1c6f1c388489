//! mtcheck core - machine-type compatibility checking
//!
//! Given the extracted machine-type and device-type data of several emulator
//! builds, ordered oldest first, this crate finds every machine type whose
//! guest-visible configuration changed between any earlier and later build:
//! - Snapshot parsing and the extraction boundary (`snapshot`)
//! - Typed override folding and default resolution (`resolve`)
//! - Pairwise comparison into diagnostics (`diff`)
//! - Full pairwise sequence validation (`validate`)
//! - Known-issue filtering and rendering (`report`)

pub mod config;
pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod report;
pub mod resolve;
pub mod snapshot;
pub mod validate;

// Re-export commonly used types
pub use config::{CheckerConfig, KnownIssueEntry};
pub use diff::{compare_machine, Diagnostic, Scope, Severity, Subject};
pub use errors::{CheckError, CheckErrorKind, Result, SnapshotError};
pub use report::{render_report, KnownIssueFilter, Outcome, ReportSummary};
pub use resolve::{resolve_machine, PropKey, PropValue, Resolved};
pub use snapshot::{parse_snapshot_bytes, parse_snapshot_value, Snapshot};
pub use validate::validate_sequence;
