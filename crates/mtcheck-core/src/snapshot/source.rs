//! Snapshot sources.
//!
//! Where a snapshot's raw records come from: a dump file written earlier, or
//! a live emulator binary queried through the gdb-based extractor script.
//! Sources only produce the raw JSON; [`crate::snapshot::parse`] turns it
//! into a [`crate::snapshot::Snapshot`].

use crate::errors::{CheckError, CheckErrorKind, SnapshotError};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;

/// Anything that can produce one build's raw snapshot records
pub trait SnapshotSource {
    /// Operator-facing label used in diagnostics
    fn label(&self) -> &str;

    /// Produce the raw JSON record array
    ///
    /// # Errors
    ///
    /// Returns `Io`, `InvalidSnapshot` or `Extraction` errors depending on the source.
    fn load(&self) -> Result<Value, CheckError>;
}

/// A snapshot source as named on the command line
///
/// `raw:<path>` and `qemu:<path>` are explicit; a bare path ending in
/// `.json` is a dump file and anything else is an emulator binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    RawFile(PathBuf),
    Binary(PathBuf),
}

impl SourceSpec {
    /// The path the spec points at
    pub fn path(&self) -> &Path {
        match self {
            SourceSpec::RawFile(p) | SourceSpec::Binary(p) => p,
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, SourceSpec::Binary(_))
    }
}

impl FromStr for SourceSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(path) = s.strip_prefix("raw:") {
            non_empty(path).map(SourceSpec::RawFile)
        } else if let Some(path) = s.strip_prefix("qemu:") {
            non_empty(path).map(SourceSpec::Binary)
        } else {
            let path = non_empty(s)?;
            if path.extension().is_some_and(|ext| ext == "json") {
                Ok(SourceSpec::RawFile(path))
            } else {
                Ok(SourceSpec::Binary(path))
            }
        }
    }
}

fn non_empty(path: &str) -> Result<PathBuf, String> {
    if path.is_empty() {
        Err("empty snapshot source path".to_string())
    } else {
        Ok(PathBuf::from(path))
    }
}

/// A snapshot previously dumped to a JSON file
#[derive(Debug, Clone)]
pub struct RawFileSource {
    path: PathBuf,
    label: String,
}

impl RawFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = path.display().to_string();
        Self { path, label }
    }
}

impl SnapshotSource for RawFileSource {
    fn label(&self) -> &str {
        &self.label
    }

    fn load(&self) -> Result<Value, CheckError> {
        let bytes = std::fs::read(&self.path).map_err(|e| {
            CheckError::from(e)
                .with_op("load_raw_file")
                .with_source_label(self.label.clone())
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            CheckError::new(CheckErrorKind::InvalidSnapshot)
                .with_op("load_raw_file")
                .with_source_label(self.label.clone())
                .with_message(format!("snapshot is not valid JSON: {}", e))
        })
    }
}

/// A live emulator binary queried through gdb
///
/// Runs two extractor passes: one for the requested machine types, then one
/// for every device type their compat properties reference.
#[derive(Debug, Clone)]
pub struct GdbExtractorSource {
    binary: PathBuf,
    label: String,
    gdb: PathBuf,
    script: PathBuf,
    machines: Vec<String>,
}

impl GdbExtractorSource {
    pub fn new(
        binary: impl Into<PathBuf>,
        gdb: impl Into<PathBuf>,
        script: impl Into<PathBuf>,
        machines: Vec<String>,
    ) -> Self {
        let binary = binary.into();
        let label = binary.display().to_string();
        Self {
            binary,
            label,
            gdb: gdb.into(),
            script: script.into(),
            machines,
        }
    }

    /// Arguments for the machine-type pass
    pub fn machine_pass_args(&self) -> Vec<String> {
        self.pass_args("-M", &self.machines)
    }

    /// Arguments for the device-type pass
    pub fn device_pass_args(&self, device_types: &BTreeSet<String>) -> Vec<String> {
        let devices: Vec<String> = device_types.iter().cloned().collect();
        self.pass_args("-D", &devices)
    }

    fn pass_args(&self, flag: &str, names: &[String]) -> Vec<String> {
        let mut args = vec![
            "-q".to_string(),
            "-P".to_string(),
            self.script.display().to_string(),
        ];
        for name in names {
            args.push(flag.to_string());
            args.push(name.clone());
        }
        args.push(self.binary.display().to_string());
        args
    }

    fn run_pass(&self, args: &[String]) -> Result<Vec<Value>, CheckError> {
        tracing::debug!(binary = self.label.as_str(), args = ?args, "running extractor");
        let output = Command::new(&self.gdb)
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| self.failure(format!("cannot run {}: {}", self.gdb.display(), e)))?;

        // The extractor exits non-zero whenever a query raised, but still
        // prints every record; only an empty stdout is fatal.
        if output.stdout.iter().all(u8::is_ascii_whitespace) {
            return Err(self.failure(format!("no output (exit status: {})", output.status)));
        }
        match serde_json::from_slice::<Value>(&output.stdout) {
            Ok(Value::Array(records)) => Ok(records),
            Ok(_) => Err(self.failure("extractor output is not a JSON array".to_string())),
            Err(e) => Err(self.failure(format!(
                "extractor output is not valid JSON ({}): {}",
                output.status, e
            ))),
        }
    }

    fn failure(&self, reason: String) -> CheckError {
        CheckError::from(SnapshotError::ExtractorFailed {
            binary: self.label.clone(),
            reason,
        })
        .with_op("extract_snapshot")
    }
}

impl SnapshotSource for GdbExtractorSource {
    fn label(&self) -> &str {
        &self.label
    }

    fn load(&self) -> Result<Value, CheckError> {
        if self.machines.is_empty() {
            return Err(self.failure("no machine types requested".to_string()));
        }
        let mut records = self.run_pass(&self.machine_pass_args())?;
        let device_types = referenced_device_types(&records);
        if !device_types.is_empty() {
            let devices = self
                .run_pass(&self.device_pass_args(&device_types))
                .map_err(|e| self.failure("device-type pass failed".to_string()).with_source(e))?;
            records.extend(devices);
        }
        Ok(Value::Array(records))
    }
}

/// Collect the `driver` of every compat property in successful machine records
pub fn referenced_device_types(records: &[Value]) -> BTreeSet<String> {
    records
        .iter()
        .filter(|r| r.pointer("/request/0").and_then(Value::as_str) == Some("machine"))
        .filter_map(|r| r.pointer("/result/compat_props").and_then(Value::as_array))
        .flatten()
        .filter_map(|cp| cp.get("driver").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_source_spec_prefixes_and_extension() {
        assert_eq!(
            "raw:/tmp/a".parse::<SourceSpec>().unwrap(),
            SourceSpec::RawFile(PathBuf::from("/tmp/a"))
        );
        assert_eq!(
            "qemu:/usr/bin/qemu.json".parse::<SourceSpec>().unwrap(),
            SourceSpec::Binary(PathBuf::from("/usr/bin/qemu.json"))
        );
        assert!("dump-2.9.json".parse::<SourceSpec>().unwrap().path().ends_with("dump-2.9.json"));
        assert!("/usr/bin/qemu-system-x86_64"
            .parse::<SourceSpec>()
            .unwrap()
            .is_binary());
        assert!("raw:".parse::<SourceSpec>().is_err());
    }

    #[test]
    fn test_extractor_arguments() {
        let src = GdbExtractorSource::new(
            "/opt/qemu",
            "gdb",
            "extract-qemu-info.py",
            vec!["pc-1.0".to_string(), "pc-1.1".to_string()],
        );
        assert_eq!(
            src.machine_pass_args(),
            vec!["-q", "-P", "extract-qemu-info.py", "-M", "pc-1.0", "-M", "pc-1.1", "/opt/qemu"]
        );
        let devices: BTreeSet<String> = ["e1000".to_string()].into_iter().collect();
        assert_eq!(
            src.device_pass_args(&devices),
            vec!["-q", "-P", "extract-qemu-info.py", "-D", "e1000", "/opt/qemu"]
        );
    }

    #[test]
    fn test_referenced_device_types_skips_failed_and_device_records() {
        let records = vec![
            json!({"request": ["machine", "a"], "result": {"compat_props": [
                {"driver": "virtio-net-pci", "property": "mq", "value": "off"},
                {"driver": "e1000", "property": "autoneg", "value": "off"}
            ]}}),
            json!({"request": ["machine", "b"], "exception": {"message": "nope"}}),
            json!({"request": ["device-type", "x"], "result": {"compat_props": [
                {"driver": "ignored", "property": "p", "value": "v"}
            ]}}),
        ];
        let found: Vec<String> = referenced_device_types(&records).into_iter().collect();
        assert_eq!(found, vec!["e1000", "virtio-net-pci"]);
    }

    #[test]
    fn test_missing_raw_file_is_io_error() {
        let src = RawFileSource::new("/nonexistent/mtcheck/snapshot.json");
        let err = src.load().unwrap_err();
        assert_eq!(err.kind(), CheckErrorKind::Io);
        assert_eq!(err.source_label(), Some("/nonexistent/mtcheck/snapshot.json"));
    }
}
