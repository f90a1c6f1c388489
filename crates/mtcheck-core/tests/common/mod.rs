use mtcheck_core::{parse_snapshot_value, Diagnostic, Severity, Snapshot};
use mtcheck_core_types::SnapshotRef;
use serde_json::{json, Value};

/// A successful `machine` record
#[allow(dead_code)]
pub fn machine(name: &str, result: Value) -> Value {
    json!({"request": ["machine", name], "result": result})
}

/// A `machine` record with the given `compat_props` and scalar fields
#[allow(dead_code)]
pub fn machine_with(name: &str, overrides: &[(&str, &str, &str)], fields: Value) -> Value {
    let mut result = fields;
    let props: Vec<Value> = overrides
        .iter()
        .map(|(d, p, v)| json!({"driver": d, "property": p, "value": v}))
        .collect();
    result["compat_props"] = Value::Array(props);
    machine(name, result)
}

/// A `device-type` record carrying a full declared list plus instance list
#[allow(dead_code)]
pub fn device_type(name: &str, props: Value, instance_props: Option<Value>) -> Value {
    let mut result = json!({"props": props});
    if let Some(instance) = instance_props {
        result["instance_props"] = instance;
    }
    json!({"request": ["device-type", name], "result": result})
}

/// A declared `bool` property with its default
#[allow(dead_code)]
pub fn bool_prop(name: &str, defval: bool) -> Value {
    json!({"name": name, "defval": defval, "info": {"name": "bool"}})
}

/// A declared `uint32` property with its default
#[allow(dead_code)]
pub fn u32_prop(name: &str, defval: u64) -> Value {
    json!({"name": name, "defval": defval, "info": {"name": "uint32"}})
}

/// The record the extractor writes for a type the build does not have
#[allow(dead_code)]
pub fn not_compiled(kind: &str, name: &str) -> Value {
    json!({
        "request": [kind, name],
        "exception": {"type": "Exception", "message": format!("Can't find type {}", name)},
        "traceback": "Traceback (most recent call last):\n..."
    })
}

/// Parse records as the snapshot at `index`, labelled `label`
#[allow(dead_code)]
pub fn snapshot(index: usize, label: &str, records: Value) -> Snapshot {
    parse_snapshot_value(&records, SnapshotRef::new(index, label)).unwrap()
}

#[allow(dead_code)]
pub fn errors(diags: &[Diagnostic]) -> Vec<&Diagnostic> {
    diags.iter().filter(|d| d.severity == Severity::Error).collect()
}

#[allow(dead_code)]
pub fn warnings(diags: &[Diagnostic]) -> Vec<&Diagnostic> {
    diags
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .collect()
}

#[allow(dead_code)]
pub fn lines(diags: &[Diagnostic]) -> Vec<String> {
    diags.iter().map(|d| d.to_string()).collect()
}
