//! CLI check/dump integration tests
//!
//! These run the built `mtcheck` binary against snapshot dumps written to a
//! temporary directory and assert on stdout, stderr and the exit status.

use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

fn write_snapshot(dir: &TempDir, name: &str, records: Value) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_vec_pretty(&records).unwrap()).unwrap();
    path
}

fn pc(max_cpus: u64, overrides: Value) -> Value {
    json!([
        {"request": ["machine", "pc-i440fx-2.9"], "result": {
            "max_cpus": max_cpus,
            "compat_props": overrides
        }},
        {"request": ["device-type", "e1000"], "result": {
            "props": [{"name": "autoneg", "defval": true, "info": {"name": "bool"}}],
            "instance_props": []
        }}
    ])
}

fn mtcheck(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mtcheck"))
        .current_dir(dir.path())
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

#[test]
fn test_identical_snapshots_exit_zero_with_no_output() {
    let dir = TempDir::new().unwrap();
    write_snapshot(&dir, "old.json", pc(255, json!([])));
    write_snapshot(&dir, "new.json", pc(255, json!([])));

    let output = mtcheck(&dir, &["-q", "check", "old.json", "new.json"]);

    assert!(
        output.status.success(),
        "Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(output.stdout.is_empty());
}

#[test]
fn test_regression_exits_one_and_prints_error_line() {
    let dir = TempDir::new().unwrap();
    write_snapshot(&dir, "old.json", pc(255, json!([])));
    write_snapshot(
        &dir,
        "new.json",
        pc(
            288,
            json!([{"driver": "e1000", "property": "autoneg", "value": "off"}]),
        ),
    );

    let output = mtcheck(&dir, &["-q", "check", "raw:old.json", "raw:new.json"]);

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "ERROR: old.json vs new.json: pc-i440fx-2.9: difference at machine.max_cpus (255 != 288)",
            "ERROR: old.json vs new.json: pc-i440fx-2.9: difference at e1000.autoneg (true != false)",
        ]
    );
}

#[test]
fn test_warnings_only_exit_zero() {
    let dir = TempDir::new().unwrap();
    write_snapshot(
        &dir,
        "old.json",
        json!([{"request": ["machine", "pc"], "result": {"max_cpus": 1}}]),
    );
    write_snapshot(
        &dir,
        "new.json",
        json!([{"request": ["machine", "pc"], "result": {"max_cpus": 0, "hw_version": "2.10"}}]),
    );

    let output = mtcheck(&dir, &["-q", "check", "old.json", "new.json"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim_end(),
        "WARNING: old.json vs new.json: pc: I don't know how to deal with missing hw_version field (absent in old.json)"
    );
}

#[test]
fn test_known_issues_suppress_errors() {
    let dir = TempDir::new().unwrap();
    write_snapshot(&dir, "old.json", pc(255, json!([])));
    write_snapshot(&dir, "new.json", pc(288, json!([])));
    fs::write(
        dir.path().join("known.txt"),
        "# max_cpus was raised on purpose\nmachine\\.max_cpus\n",
    )
    .unwrap();

    let output = mtcheck(
        &dir,
        &[
            "-q",
            "check",
            "--known-issues",
            "known.txt",
            "--show-suppressed",
            "old.json",
            "new.json",
        ],
    );

    assert!(
        output.status.success(),
        "Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(
        "SUPPRESSED ERROR: old.json vs new.json: pc-i440fx-2.9: difference at machine.max_cpus (255 != 288)"
    ));
}

#[test]
fn test_config_file_ignore_fields() {
    let dir = TempDir::new().unwrap();
    write_snapshot(&dir, "old.json", pc(255, json!([])));
    write_snapshot(&dir, "new.json", pc(288, json!([])));
    fs::write(
        dir.path().join("mtcheck.toml"),
        "ignore_fields = [\"name\", \"desc\", \"max_cpus\"]\n",
    )
    .unwrap();

    let output = mtcheck(
        &dir,
        &["-q", "check", "--config", "mtcheck.toml", "old.json", "new.json"],
    );

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_json_format_one_object_per_line() {
    let dir = TempDir::new().unwrap();
    write_snapshot(&dir, "a.json", pc(1, json!([])));
    write_snapshot(&dir, "b.json", pc(2, json!([])));
    write_snapshot(&dir, "c.json", pc(3, json!([])));

    let output = mtcheck(
        &dir,
        &["-q", "check", "--format", "json", "a.json", "b.json", "c.json"],
    );

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let records: Vec<Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    let contexts: Vec<&str> = records
        .iter()
        .map(|r| r["context"].as_str().unwrap())
        .collect();
    assert_eq!(
        contexts,
        vec![
            "a.json vs b.json: pc-i440fx-2.9",
            "a.json vs c.json: pc-i440fx-2.9",
            "b.json vs c.json: pc-i440fx-2.9",
        ]
    );
    assert!(records.iter().all(|r| r["severity"] == "error"));
}

#[test]
fn test_malformed_snapshot_is_fatal() {
    let dir = TempDir::new().unwrap();
    write_snapshot(&dir, "old.json", pc(255, json!([])));
    write_snapshot(&dir, "bad.json", json!([{"request": ["machine", "pc"]}]));

    let output = mtcheck(&dir, &["-q", "check", "old.json", "bad.json"]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"), "Stderr: {}", stderr);
    assert!(stderr.contains("ERR_MISSING_FIELD"), "Stderr: {}", stderr);
}

#[test]
fn test_binary_source_requires_machine() {
    let dir = TempDir::new().unwrap();
    write_snapshot(&dir, "old.json", pc(255, json!([])));

    let output = mtcheck(&dir, &["-q", "check", "old.json", "qemu:qemu-system-x86_64"]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERR_INVALID_INPUT"), "Stderr: {}", stderr);
    assert!(stderr.contains("--machine is required"), "Stderr: {}", stderr);
    assert!(stderr.contains("qemu-system-x86_64"), "Stderr: {}", stderr);
}

#[test]
fn test_dump_raw_file_round_trips_records() {
    let dir = TempDir::new().unwrap();
    let records = pc(255, json!([]));
    write_snapshot(&dir, "in.json", records.clone());

    let output = mtcheck(&dir, &["-q", "dump", "in.json", "-o", "out.json"]);

    assert!(output.status.success());
    let written: Value =
        serde_json::from_slice(&fs::read(dir.path().join("out.json")).unwrap()).unwrap();
    assert_eq!(written, records);
}

#[cfg(unix)]
#[test]
fn test_extraction_through_gdb_runs_machine_then_device_pass() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let fake_gdb = dir.path().join("fake-gdb");
    fs::write(
        &fake_gdb,
        r#"#!/bin/sh
case "$*" in
  *" -M "*) echo '[{"request":["machine","pc-i440fx-2.9"],"result":{"max_cpus":255,"compat_props":[{"driver":"e1000","property":"autoneg","value":"off"}]}}]' ;;
  *" -D e1000 "*) echo '[{"request":["device-type","e1000"],"result":{"props":[{"name":"autoneg","defval":true,"info":{"name":"bool"}}],"instance_props":[]}}]' ;;
  *) exit 1 ;;
esac
"#,
    )
    .unwrap();
    fs::set_permissions(&fake_gdb, fs::Permissions::from_mode(0o755)).unwrap();
    let gdb = fake_gdb.to_str().unwrap();

    let output = mtcheck(
        &dir,
        &[
            "-q", "dump", "qemu:qemu-kvm", "-M", "pc-i440fx-2.9", "--gdb", gdb, "-o", "dump.json",
        ],
    );
    assert!(
        output.status.success(),
        "Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let dumped: Value =
        serde_json::from_slice(&fs::read(dir.path().join("dump.json")).unwrap()).unwrap();
    assert_eq!(dumped.as_array().unwrap().len(), 2);
    assert_eq!(dumped[1]["request"], json!(["device-type", "e1000"]));

    write_snapshot(&dir, "old.json", pc(255, json!([])));
    let output = mtcheck(
        &dir,
        &[
            "-q",
            "check",
            "-M",
            "pc-i440fx-2.9",
            "--gdb",
            gdb,
            "old.json",
            "qemu:qemu-kvm",
        ],
    );
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim_end(),
        "ERROR: old.json vs qemu-kvm: pc-i440fx-2.9: difference at e1000.autoneg (true != false)"
    );
}

#[cfg(unix)]
#[test]
fn test_failed_device_pass_reports_cause() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let fake_gdb = dir.path().join("fake-gdb");
    fs::write(
        &fake_gdb,
        r#"#!/bin/sh
case "$*" in
  *" -M "*) echo '[{"request":["machine","pc-i440fx-2.9"],"result":{"max_cpus":255,"compat_props":[{"driver":"virtio-net-pci","property":"mq","value":"off"}]}}]' ;;
  *) exit 1 ;;
esac
"#,
    )
    .unwrap();
    fs::set_permissions(&fake_gdb, fs::Permissions::from_mode(0o755)).unwrap();
    let gdb = fake_gdb.to_str().unwrap();

    let output = mtcheck(
        &dir,
        &[
            "-q", "dump", "qemu:qemu-kvm", "-M", "pc-i440fx-2.9", "--gdb", gdb, "-o", "dump.json",
        ],
    );

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERR_EXTRACTION"), "Stderr: {}", stderr);
    assert!(stderr.contains("device-type pass failed"), "Stderr: {}", stderr);
    assert!(stderr.contains("caused by"), "Stderr: {}", stderr);
    assert!(stderr.contains("no output"), "Stderr: {}", stderr);
    assert!(!dir.path().join("dump.json").exists());
}
