//! In-memory snapshot types.

use mtcheck_core_types::SnapshotRef;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One compatibility override pinned by a machine type
///
/// Order matters within the owning machine: a later entry for the same
/// `(driver, property)` key replaces an earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatOverride {
    pub driver: String,
    pub property: String,
    pub value: String,
}

/// A machine type as seen by one build
#[derive(Debug, Clone, PartialEq)]
pub struct MachineDescriptor {
    pub name: String,
    /// Every result key except `compat_props`, as extracted.
    ///
    /// Presence varies between builds; older builds lack fields added later.
    pub fields: BTreeMap<String, Value>,
    pub compat_props: Vec<CompatOverride>,
}

impl MachineDescriptor {
    /// Iterate over the fields holding a JSON scalar (bool, number, string, null)
    pub fn scalar_fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields
            .iter()
            .filter(|(_, v)| !v.is_object() && !v.is_array())
            .map(|(k, v)| (k.as_str(), v))
    }
}

/// Type metadata attached to a declared property
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PropertyInfo {
    /// Property type name, e.g. `bool`, `uint32`, `on/off/auto`
    #[serde(default)]
    pub name: Option<String>,
    /// Whether the extractor saw an enum lookup table
    #[serde(default)]
    pub enum_table: Option<Value>,
}

/// A qdev property declared by a device type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclaredProperty {
    pub name: String,
    /// Absent when setting a default has no effect for the property type
    #[serde(default)]
    pub defval: Option<Value>,
    #[serde(default)]
    pub info: Option<PropertyInfo>,
}

/// A property found by instantiating the device type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceProperty {
    pub name: String,
    #[serde(default, rename = "type")]
    pub type_name: Option<String>,
    /// Present only when the extractor could read the live value
    #[serde(default)]
    pub value: Option<Value>,
}

/// A device type that exists in the build
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeviceTypeDescriptor {
    pub name: String,
    pub props: Option<Vec<DeclaredProperty>>,
    /// Presence, even when empty, means a live instance was introspected
    pub instance_props: Option<Vec<InstanceProperty>>,
}

impl DeviceTypeDescriptor {
    /// Find a declared property by name
    pub fn declared(&self, property: &str) -> Option<&DeclaredProperty> {
        self.props
            .as_deref()
            .and_then(|props| props.iter().find(|p| p.name == property))
    }

    /// Find an introspected instance property by name
    pub fn instance(&self, property: &str) -> Option<&InstanceProperty> {
        self.instance_props
            .as_deref()
            .and_then(|props| props.iter().find(|p| p.name == property))
    }

    /// True when the declared list is non-empty and an instance was introspected
    ///
    /// Only then can a missing property name be called invalid.
    pub fn is_fully_introspected(&self) -> bool {
        let declared = self.props.as_ref().is_some_and(|p| !p.is_empty());
        declared && self.instance_props.is_some()
    }
}

/// What one snapshot knows about a device type name
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceTypeRecord {
    /// The build has the type
    Present(DeviceTypeDescriptor),
    /// The extractor looked for the type and the build does not have it
    NotCompiled { message: String },
}

/// One build's extracted data
#[derive(Debug, Clone)]
pub struct Snapshot {
    reference: SnapshotRef,
    digest: String,
    machines: Vec<MachineDescriptor>,
    machine_index: BTreeMap<String, usize>,
    device_types: BTreeMap<String, DeviceTypeRecord>,
    missing_machines: Vec<String>,
}

impl Snapshot {
    /// Build a snapshot from already-validated parts
    ///
    /// Machines keep their record order; a later record for the same machine
    /// name replaces the earlier one in place.
    pub fn new(
        reference: SnapshotRef,
        digest: String,
        machines: Vec<MachineDescriptor>,
        device_types: BTreeMap<String, DeviceTypeRecord>,
        missing_machines: Vec<String>,
    ) -> Self {
        let mut ordered: Vec<MachineDescriptor> = Vec::with_capacity(machines.len());
        let mut machine_index = BTreeMap::new();
        for machine in machines {
            match machine_index.get(&machine.name) {
                Some(&pos) => ordered[pos] = machine,
                None => {
                    machine_index.insert(machine.name.clone(), ordered.len());
                    ordered.push(machine);
                }
            }
        }
        Self {
            reference,
            digest,
            machines: ordered,
            machine_index,
            device_types,
            missing_machines,
        }
    }

    /// Identity of this snapshot in the run
    pub fn reference(&self) -> &SnapshotRef {
        &self.reference
    }

    /// SHA-256 (hex) of the serialized records this snapshot was parsed from
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Machines in record order
    pub fn machines(&self) -> &[MachineDescriptor] {
        &self.machines
    }

    /// Look up a machine by name
    pub fn machine(&self, name: &str) -> Option<&MachineDescriptor> {
        self.machine_index.get(name).map(|&i| &self.machines[i])
    }

    /// Look up what this snapshot knows about a device type
    ///
    /// `None` means the type was never queried: no information.
    pub fn device_type(&self, name: &str) -> Option<&DeviceTypeRecord> {
        self.device_types.get(name)
    }

    /// All device type records, keyed by name
    pub fn device_types(&self) -> &BTreeMap<String, DeviceTypeRecord> {
        &self.device_types
    }

    /// Machine names the extractor was asked for but the build does not have
    pub fn missing_machines(&self) -> &[String] {
        &self.missing_machines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn machine(name: &str, max_cpus: i64) -> MachineDescriptor {
        let mut fields = BTreeMap::new();
        fields.insert("max_cpus".to_string(), json!(max_cpus));
        MachineDescriptor {
            name: name.to_string(),
            fields,
            compat_props: Vec::new(),
        }
    }

    #[test]
    fn test_repeated_machine_record_replaces_in_place() {
        let snap = Snapshot::new(
            SnapshotRef::new(0, "a"),
            String::new(),
            vec![machine("m1", 1), machine("m2", 2), machine("m1", 3)],
            BTreeMap::new(),
            Vec::new(),
        );
        let names: Vec<&str> = snap.machines().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["m1", "m2"]);
        assert_eq!(snap.machine("m1").unwrap().fields["max_cpus"], json!(3));
    }

    #[test]
    fn test_scalar_fields_skip_objects_and_arrays() {
        let mut m = machine("m", 4);
        m.fields.insert("nested".to_string(), json!({"a": 1}));
        m.fields.insert("list".to_string(), json!([1, 2]));
        m.fields.insert("hw_version".to_string(), json!(null));
        let names: Vec<&str> = m.scalar_fields().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["hw_version", "max_cpus"]);
    }

    #[test]
    fn test_fully_introspected_requires_declared_and_instance_lists() {
        let mut dev = DeviceTypeDescriptor {
            name: "e1000".to_string(),
            props: Some(vec![DeclaredProperty {
                name: "mac".to_string(),
                defval: None,
                info: None,
            }]),
            instance_props: None,
        };
        assert!(!dev.is_fully_introspected());
        dev.instance_props = Some(Vec::new());
        assert!(dev.is_fully_introspected());
        dev.props = Some(Vec::new());
        assert!(!dev.is_fully_introspected());
    }
}
