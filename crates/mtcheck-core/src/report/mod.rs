//! Rendering boundary: known-issue filtering, output sinks and the run summary.
//!
//! The comparison engine always produces the full diagnostic set; everything
//! here happens afterwards.

pub mod filter;
pub mod sink;
pub mod summary;

pub use filter::KnownIssueFilter;
pub use sink::{CollectSink, DiagnosticSink, JsonLinesSink, TextSink};
pub use summary::{render_report, Outcome, ReportSummary};
