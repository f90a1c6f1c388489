//! Text rendering and known-issue filtering tests

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::*;
use mtcheck_core::report::{CollectSink, TextSink};
use mtcheck_core::{
    render_report, validate_sequence, CheckerConfig, KnownIssueFilter, Outcome, ReportSummary,
};
use serde_json::json;

fn sample_diagnostics() -> Vec<mtcheck_core::Diagnostic> {
    let a = snapshot(
        0,
        "qemu-2.9",
        json!([machine_with(
            "pc-i440fx-2.9",
            &[("isa-fdc", "fallback", "144")],
            json!({"max_cpus": 255})
        )]),
    );
    let b = snapshot(
        1,
        "qemu-2.10",
        json!([machine_with("pc-i440fx-2.9", &[], json!({"max_cpus": 288}))]),
    );
    validate_sequence(&[a, b], &CheckerConfig::default(), None)
}

#[test]
fn test_text_report_renders_all_lines() {
    let diags = sample_diagnostics();
    let mut sink = TextSink::new(Vec::new());
    let summary = render_report(&diags, &KnownIssueFilter::empty(), &mut sink).unwrap();

    let text = String::from_utf8(sink.into_inner()).unwrap();
    assert_eq!(
        text,
        "ERROR: qemu-2.9 vs qemu-2.10: pc-i440fx-2.9: difference at machine.max_cpus (255 != 288)\n\
         WARNING: qemu-2.9 vs qemu-2.10: pc-i440fx-2.9: I don't know the default value of isa-fdc.fallback (in qemu-2.10)\n"
    );
    assert_eq!(
        summary,
        ReportSummary {
            errors: 1,
            warnings: 1,
            suppressed: 0
        }
    );
    assert_eq!(summary.outcome(), Outcome::Failed);
}

#[test]
fn test_configured_known_issues_and_plain_text_combine() {
    let cfg = CheckerConfig::from_toml_str(
        r#"
[[known_issue]]
pattern = "I don't know the default value"
severity = "warning"
"#,
    )
    .unwrap();
    let mut filter = KnownIssueFilter::from_entries(&cfg.known_issue).unwrap();
    filter.extend(KnownIssueFilter::from_plain_text("machine\\.max_cpus \\(255 != 288\\)").unwrap());

    let mut sink = CollectSink::default();
    let summary = render_report(&sample_diagnostics(), &filter, &mut sink).unwrap();
    assert_eq!(summary.suppressed, 2);
    assert_eq!(summary.outcome(), Outcome::Clean);
    assert!(sink.emitted.is_empty());
}

#[test]
fn test_core_emits_everything_regardless_of_filter() {
    // suppression only happens at the rendering boundary
    let before = sample_diagnostics();
    let filter = KnownIssueFilter::from_plain_text(".*").unwrap();
    let mut sink = CollectSink::default();
    render_report(&before, &filter, &mut sink).unwrap();
    assert_eq!(sink.suppressed, before);
    assert_eq!(sample_diagnostics().len(), 2);
}

#[test]
fn test_known_issue_file_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("known-issues.txt");
    std::fs::write(&path, "# accepted upstream\n^WARNING: \n").unwrap();

    let filter = KnownIssueFilter::load_plain_text(&path).unwrap();
    let mut sink = CollectSink::default();
    let summary = render_report(&sample_diagnostics(), &filter, &mut sink).unwrap();
    assert_eq!(summary.warnings, 0);
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.suppressed, 1);
}
