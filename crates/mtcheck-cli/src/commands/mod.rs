//! Subcommands

pub mod check;
pub mod dump;

use clap::Args;
use mtcheck_core::errors::{CheckError, CheckErrorKind};
use mtcheck_core::snapshot::{GdbExtractorSource, RawFileSource, SnapshotSource, SourceSpec};
use std::path::PathBuf;

/// Options for querying emulator binaries
#[derive(Debug, Clone, Args)]
pub struct ExtractorArgs {
    /// Machine type to extract and compare (repeatable)
    #[arg(short = 'M', long = "machine", value_name = "NAME")]
    pub machines: Vec<String>,

    /// gdb executable
    #[arg(long, value_name = "PATH", default_value = "gdb")]
    pub gdb: PathBuf,

    /// Extractor script loaded into gdb
    #[arg(long, value_name = "SCRIPT", default_value = "extract-qemu-info.py")]
    pub extractor: PathBuf,
}

impl ExtractorArgs {
    pub fn open(&self, spec: &SourceSpec) -> Box<dyn SnapshotSource> {
        match spec {
            SourceSpec::RawFile(path) => Box::new(RawFileSource::new(path.clone())),
            SourceSpec::Binary(path) => Box::new(GdbExtractorSource::new(
                path.clone(),
                self.gdb.clone(),
                self.extractor.clone(),
                self.machines.clone(),
            )),
        }
    }

    /// Fail early when a binary is named without any machine to extract
    pub fn require_machines(&self, specs: &[SourceSpec]) -> Result<(), CheckError> {
        match specs.iter().find(|s| s.is_binary()) {
            Some(spec) if self.machines.is_empty() => Err(CheckError::new(
                CheckErrorKind::InvalidInput,
            )
            .with_op("require_machines")
            .with_source_label(spec.path().display().to_string())
            .with_message("--machine is required to extract from an emulator binary")),
            _ => Ok(()),
        }
    }
}
