//! Dump command

use crate::commands::ExtractorArgs;
use anyhow::Context;
use clap::Args;
use mtcheck_core::snapshot::SourceSpec;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct DumpArgs {
    /// Snapshot source (`raw:FILE`, `qemu:BINARY`, or a path)
    #[arg(value_name = "SOURCE")]
    pub source: SourceSpec,

    #[command(flatten)]
    pub extractor: ExtractorArgs,

    /// Output file
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: PathBuf,
}

pub fn execute(args: DumpArgs) -> anyhow::Result<()> {
    args.extractor
        .require_machines(std::slice::from_ref(&args.source))?;

    let source = args.extractor.open(&args.source);
    let raw = source.load()?;
    let text = serde_json::to_string_pretty(&raw)?;
    std::fs::write(&args.output, text + "\n")
        .with_context(|| format!("writing {}", args.output.display()))?;

    tracing::info!(
        source = source.label(),
        output = %args.output.display(),
        "raw snapshot written"
    );
    Ok(())
}
