//! Check command

use crate::commands::ExtractorArgs;
use anyhow::Context;
use clap::{Args, ValueEnum};
use mtcheck_core::report::{DiagnosticSink, JsonLinesSink, TextSink};
use mtcheck_core::snapshot::SourceSpec;
use mtcheck_core::{
    parse_snapshot_value, render_report, validate_sequence, CheckerConfig, KnownIssueFilter,
    Outcome, Snapshot,
};
use mtcheck_core_types::SnapshotRef;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::ExitCode;

/// Exit status when unsuppressed errors remain
const EXIT_ERRORS: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Snapshot sources, oldest build first (`raw:FILE`, `qemu:BINARY`, or a path)
    #[arg(required = true, value_name = "SOURCE")]
    pub sources: Vec<SourceSpec>,

    #[command(flatten)]
    pub extractor: ExtractorArgs,

    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Known-issue patterns, one regular expression per line
    #[arg(long, value_name = "FILE")]
    pub known_issues: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Also print diagnostics matched by a known issue
    #[arg(long)]
    pub show_suppressed: bool,
}

pub fn execute(args: CheckArgs) -> anyhow::Result<ExitCode> {
    args.extractor.require_machines(&args.sources)?;

    let config = match &args.config {
        Some(path) => CheckerConfig::load(path)?,
        None => CheckerConfig::default(),
    };
    let mut filter = KnownIssueFilter::from_entries(&config.known_issue)?;
    if let Some(path) = &args.known_issues {
        filter.extend(KnownIssueFilter::load_plain_text(path)?);
    }

    let snapshots = load_snapshots(&args)?;

    let machine_filter: Option<BTreeSet<String>> = if args.extractor.machines.is_empty() {
        None
    } else {
        Some(args.extractor.machines.iter().cloned().collect())
    };
    let diagnostics = validate_sequence(&snapshots, &config, machine_filter.as_ref());

    let stdout = std::io::stdout().lock();
    let mut sink: Box<dyn DiagnosticSink> = match args.format {
        OutputFormat::Text => {
            let sink = TextSink::new(stdout);
            if args.show_suppressed {
                Box::new(sink.with_suppressed_output(Box::new(std::io::stderr())))
            } else {
                Box::new(sink)
            }
        }
        OutputFormat::Json => {
            Box::new(JsonLinesSink::new(stdout).include_suppressed(args.show_suppressed))
        }
    };
    let summary = render_report(&diagnostics, &filter, sink.as_mut())?;

    tracing::info!(
        errors = summary.errors as u64,
        warnings = summary.warnings as u64,
        suppressed = summary.suppressed as u64,
        "check finished"
    );

    Ok(match summary.outcome() {
        Outcome::Failed => ExitCode::from(EXIT_ERRORS),
        Outcome::Clean | Outcome::WarningsOnly => ExitCode::SUCCESS,
    })
}

fn load_snapshots(args: &CheckArgs) -> anyhow::Result<Vec<Snapshot>> {
    args.sources
        .iter()
        .enumerate()
        .map(|(index, spec)| -> anyhow::Result<Snapshot> {
            let source = args.extractor.open(spec);
            let raw = source.load()?;
            let snapshot = parse_snapshot_value(&raw, SnapshotRef::new(index, source.label()))
                .with_context(|| format!("loading snapshot {}", source.label()))?;
            tracing::info!(
                snapshot = source.label(),
                digest = snapshot.digest(),
                machines = snapshot.machines().len() as u64,
                "snapshot loaded"
            );
            Ok(snapshot)
        })
        .collect()
}
