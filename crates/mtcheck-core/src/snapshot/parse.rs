//! Snapshot parsing.
//!
//! Turns the extractor's JSON record array into a [`Snapshot`]. Any
//! structural problem aborts the whole parse: analysis over partially
//! understood data would be misleading.

use crate::errors::{CheckError, CheckErrorKind, SnapshotError};
use crate::snapshot::model::{
    CompatOverride, DeclaredProperty, DeviceTypeDescriptor, DeviceTypeRecord, InstanceProperty,
    MachineDescriptor, Snapshot,
};
use crate::{log_op_end, log_op_error, log_op_start};
use mtcheck_core_types::SnapshotRef;
use serde_json::{Map, Value};
use sha2::{Digest as _, Sha256};
use std::collections::BTreeMap;

const REQUEST_MACHINE: &str = "machine";
const REQUEST_DEVICE_TYPE: &str = "device-type";

/// Parse raw snapshot bytes.
///
/// # Errors
///
/// - `InvalidSnapshot`: bytes are not UTF-8 JSON, or the records are malformed
/// - `MissingField`: a required key (`request`, `driver`, ...) is absent
/// - `UnknownRequestKind`: a record asks for something other than a machine or device type
pub fn parse_snapshot_bytes(bytes: &[u8], reference: SnapshotRef) -> Result<Snapshot, CheckError> {
    let text = std::str::from_utf8(bytes).map_err(|e| {
        CheckError::new(CheckErrorKind::InvalidSnapshot)
            .with_op("parse_snapshot")
            .with_source_label(reference.label())
            .with_message(format!("snapshot is not valid UTF-8: {}", e))
    })?;
    let raw: Value = serde_json::from_str(text).map_err(|e| {
        CheckError::new(CheckErrorKind::InvalidSnapshot)
            .with_op("parse_snapshot")
            .with_source_label(reference.label())
            .with_message(format!("snapshot is not valid JSON: {}", e))
    })?;
    parse_snapshot_value(&raw, reference)
}

/// Parse an already-decoded snapshot record array.
///
/// # Errors
///
/// Same as [`parse_snapshot_bytes`], minus the decoding failures.
pub fn parse_snapshot_value(raw: &Value, reference: SnapshotRef) -> Result<Snapshot, CheckError> {
    log_op_start!("parse_snapshot", snapshot = reference.label());
    let start = std::time::Instant::now();

    let label = reference.label().to_string();
    let snapshot = parse_records(raw, reference).map_err(|e| {
        let err = CheckError::from(e)
            .with_op("parse_snapshot")
            .with_source_label(label.clone());
        log_op_error!(
            "parse_snapshot",
            err.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            snapshot = label.as_str()
        );
        err
    })?;

    log_op_end!(
        "parse_snapshot",
        duration_ms = start.elapsed().as_millis() as u64,
        snapshot = snapshot.reference().label(),
        snapshot_digest = snapshot.digest(),
        machine_count = snapshot.machines().len() as u64
    );
    Ok(snapshot)
}

/// Hex SHA-256 of the compact serialization of the record array.
fn records_digest(raw: &Value) -> String {
    let canonical = serde_json::to_vec(raw).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    hex::encode(hasher.finalize())
}

fn parse_records(raw: &Value, reference: SnapshotRef) -> Result<Snapshot, SnapshotError> {
    let records = raw.as_array().ok_or(SnapshotError::NotAnArray)?;

    let mut machines = Vec::new();
    let mut device_types = BTreeMap::new();
    let mut missing_machines = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let obj = record
            .as_object()
            .ok_or_else(|| SnapshotError::MalformedRecord {
                index,
                reason: "record must be a JSON object".to_string(),
            })?;
        let (kind, name) = parse_request(index, obj)?;

        match (obj.get("result"), obj.get("exception")) {
            (Some(result), _) => match kind.as_str() {
                REQUEST_MACHINE => machines.push(parse_machine(index, &name, result)?),
                REQUEST_DEVICE_TYPE => {
                    let dev = parse_device_type(index, &name, result)?;
                    device_types.insert(name, DeviceTypeRecord::Present(dev));
                }
                _ => return Err(SnapshotError::UnknownRequestKind { index, kind }),
            },
            (None, Some(exception)) => {
                let message = exception
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                match kind.as_str() {
                    REQUEST_MACHINE => {
                        tracing::warn!(
                            snapshot = reference.label(),
                            machine = name.as_str(),
                            reason = message.as_str(),
                            "machine type not available in this build"
                        );
                        missing_machines.push(name);
                    }
                    REQUEST_DEVICE_TYPE => {
                        tracing::debug!(
                            snapshot = reference.label(),
                            device_type = name.as_str(),
                            reason = message.as_str(),
                            "device type not compiled in"
                        );
                        device_types.insert(name, DeviceTypeRecord::NotCompiled { message });
                    }
                    _ => return Err(SnapshotError::UnknownRequestKind { index, kind }),
                }
            }
            (None, None) => {
                return Err(SnapshotError::MissingKey {
                    index,
                    key: "result".to_string(),
                })
            }
        }
    }

    Ok(Snapshot::new(
        reference,
        records_digest(raw),
        machines,
        device_types,
        missing_machines,
    ))
}

fn parse_request(index: usize, obj: &Map<String, Value>) -> Result<(String, String), SnapshotError> {
    let request = obj.get("request").ok_or_else(|| SnapshotError::MissingKey {
        index,
        key: "request".to_string(),
    })?;
    let parts = request.as_array().ok_or_else(|| SnapshotError::WrongType {
        index,
        key: "request".to_string(),
        expected: "a [kind, name] array".to_string(),
    })?;
    match parts.as_slice() {
        [Value::String(kind), Value::String(name), ..] => Ok((kind.clone(), name.clone())),
        _ => Err(SnapshotError::WrongType {
            index,
            key: "request".to_string(),
            expected: "a [kind, name] array of strings".to_string(),
        }),
    }
}

fn parse_machine(index: usize, name: &str, result: &Value) -> Result<MachineDescriptor, SnapshotError> {
    let obj = result.as_object().ok_or_else(|| SnapshotError::WrongType {
        index,
        key: "result".to_string(),
        expected: "an object".to_string(),
    })?;

    let compat_props = match obj.get("compat_props") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(entries)) => entries
            .iter()
            .map(|entry| parse_compat_override(index, entry))
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => {
            return Err(SnapshotError::WrongType {
                index,
                key: "compat_props".to_string(),
                expected: "a list".to_string(),
            })
        }
    };

    let fields = obj
        .iter()
        .filter(|(k, _)| k.as_str() != "compat_props")
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    Ok(MachineDescriptor {
        name: name.to_string(),
        fields,
        compat_props,
    })
}

fn parse_compat_override(index: usize, entry: &Value) -> Result<CompatOverride, SnapshotError> {
    let obj = entry.as_object().ok_or_else(|| SnapshotError::WrongType {
        index,
        key: "compat_props[]".to_string(),
        expected: "an object".to_string(),
    })?;
    let text = |key: &str| -> Result<String, SnapshotError> {
        match obj.get(key) {
            None => Err(SnapshotError::MissingKey {
                index,
                key: format!("compat_props[].{}", key),
            }),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(v @ (Value::Number(_) | Value::Bool(_))) => Ok(v.to_string()),
            Some(_) => Err(SnapshotError::WrongType {
                index,
                key: format!("compat_props[].{}", key),
                expected: "a string".to_string(),
            }),
        }
    };
    Ok(CompatOverride {
        driver: text("driver")?,
        property: text("property")?,
        value: text("value")?,
    })
}

fn parse_device_type(
    index: usize,
    name: &str,
    result: &Value,
) -> Result<DeviceTypeDescriptor, SnapshotError> {
    let obj = result.as_object().ok_or_else(|| SnapshotError::WrongType {
        index,
        key: "result".to_string(),
        expected: "an object".to_string(),
    })?;

    let props: Option<Vec<DeclaredProperty>> = optional_list(index, obj, "props")?;
    let instance_props: Option<Vec<InstanceProperty>> = optional_list(index, obj, "instance_props")?;

    Ok(DeviceTypeDescriptor {
        name: name.to_string(),
        props,
        instance_props,
    })
}

fn optional_list<T: serde::de::DeserializeOwned>(
    index: usize,
    obj: &Map<String, Value>,
    key: &str,
) -> Result<Option<Vec<T>>, SnapshotError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => serde_json::from_value(v.clone())
            .map(Some)
            .map_err(|e| SnapshotError::MalformedRecord {
                index,
                reason: format!("invalid `{}`: {}", key, e),
            }),
    }
}
