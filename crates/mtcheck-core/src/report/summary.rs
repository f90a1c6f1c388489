//! Run summary and exit status.

use crate::diff::model::{Diagnostic, Severity};
use crate::errors::CheckError;
use crate::report::filter::KnownIssueFilter;
use crate::report::sink::DiagnosticSink;
use crate::{log_op_end, log_op_error, log_op_start};
use serde::Serialize;
use std::time::Instant;

/// Aggregate outcome of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// No unsuppressed diagnostics
    Clean,
    WarningsOnly,
    /// At least one unsuppressed error
    Failed,
}

/// Counts after known-issue filtering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub errors: usize,
    pub warnings: usize,
    pub suppressed: usize,
}

impl ReportSummary {
    pub fn outcome(&self) -> Outcome {
        if self.errors > 0 {
            Outcome::Failed
        } else if self.warnings > 0 {
            Outcome::WarningsOnly
        } else {
            Outcome::Clean
        }
    }
}

/// Filter `diagnostics` and write them to `sink`, in order.
///
/// # Errors
///
/// Propagates sink write failures (`ERR_IO`, `ERR_SERIALIZATION`).
pub fn render_report(
    diagnostics: &[Diagnostic],
    filter: &KnownIssueFilter,
    sink: &mut dyn DiagnosticSink,
) -> Result<ReportSummary, CheckError> {
    log_op_start!("render_report", diagnostic_count = diagnostics.len() as u64);
    let start = Instant::now();

    let result = render_inner(diagnostics, filter, sink);

    match &result {
        Ok(summary) => {
            log_op_end!(
                "render_report",
                duration_ms = start.elapsed().as_millis() as u64,
                errors = summary.errors as u64,
                warnings = summary.warnings as u64,
                suppressed = summary.suppressed as u64
            );
        }
        Err(e) => {
            log_op_error!(
                "render_report",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
        }
    }
    result.map_err(|e| e.with_op("render_report"))
}

fn render_inner(
    diagnostics: &[Diagnostic],
    filter: &KnownIssueFilter,
    sink: &mut dyn DiagnosticSink,
) -> Result<ReportSummary, CheckError> {
    let mut summary = ReportSummary::default();
    for diagnostic in diagnostics {
        if filter.is_suppressed(diagnostic) {
            summary.suppressed += 1;
            sink.emit_suppressed(diagnostic)?;
            continue;
        }
        match diagnostic.severity {
            Severity::Error => summary.errors += 1,
            Severity::Warning => summary.warnings += 1,
        }
        sink.emit(diagnostic)?;
    }
    sink.finish()?;
    Ok(summary)
}
