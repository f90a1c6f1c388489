//! Resolution of one machine type within one snapshot.
//!
//! Folds the machine's compat overrides onto device-type defaults and lints
//! overrides that name unknown devices or properties.

use crate::diff::model::{Diagnostic, Scope, Subject};
use crate::resolve::fold::{fold_overrides, PropKey};
use crate::resolve::value::{PropType, PropValue};
use crate::snapshot::model::{DeviceTypeDescriptor, DeviceTypeRecord, MachineDescriptor, Snapshot};
use mtcheck_core_types::MachineName;
use std::collections::{BTreeMap, BTreeSet};

/// Where a known value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueOrigin {
    /// The machine's compat override
    Override,
    /// The device type's declared default
    Default,
    /// The value read from an introspected instance
    Instance,
}

/// Effective state of one property, with confidence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Known { value: PropValue, origin: ValueOrigin },
    /// Nothing is known about the device type in this snapshot
    UnknownNoInfo,
    /// The device type is present but was not introspected enough to tell
    UnknownIncomplete,
    /// The fully introspected device type has no such property
    Invalid,
    /// The device type is not compiled into this build
    DeviceAbsent,
}

impl Resolved {
    pub fn known_value(&self) -> Option<&PropValue> {
        match self {
            Resolved::Known { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// Resolved value per `(device, property)` key
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EffectivePropertyState {
    values: BTreeMap<PropKey, Resolved>,
}

impl EffectivePropertyState {
    pub fn get(&self, key: &PropKey) -> Option<&Resolved> {
        self.values.get(key)
    }

    /// Keys in `(device, property)` order
    pub fn keys(&self) -> impl Iterator<Item = &PropKey> {
        self.values.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PropKey, &Resolved)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Resolver output: the state plus lint diagnostics about the override list
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub state: EffectivePropertyState,
    pub diagnostics: Vec<Diagnostic>,
}

/// Resolve a machine's effective property state in one snapshot.
///
/// Every key the machine overrides is resolved, plus `extra_keys` (typically
/// the keys the other snapshot of a comparison overrides). Diagnostics cover
/// redundant duplicate overrides and override values that do not parse as
/// the property's declared type; they are scoped to this snapshot alone.
pub fn resolve_machine(
    snapshot: &Snapshot,
    machine: &MachineDescriptor,
    extra_keys: &BTreeSet<PropKey>,
) -> Resolution {
    let scope = Scope::Snapshot {
        snapshot: snapshot.reference().clone(),
    };
    let machine_name = MachineName::from(machine.name.as_str());
    let fold = fold_overrides(&machine.compat_props);

    let mut diagnostics: Vec<Diagnostic> = fold
        .duplicates
        .iter()
        .map(|dup| {
            Diagnostic::warning(
                scope.clone(),
                &machine_name,
                Subject::property(&dup.key),
                format!("duplicate compat property: {}={}", dup.key, dup.value),
            )
        })
        .collect();

    let mut values = BTreeMap::new();

    for (key, folded) in &fold.values {
        let resolved = match snapshot.device_type(&key.device) {
            Some(DeviceTypeRecord::NotCompiled { .. }) => Resolved::DeviceAbsent,
            Some(DeviceTypeRecord::Present(dev)) if !property_exists(dev, &key.property) => {
                Resolved::Invalid
            }
            record => {
                let ty = match record {
                    Some(DeviceTypeRecord::Present(dev)) => property_type(dev, &key.property),
                    _ => PropType::Unknown,
                };
                let value = PropValue::parse(&folded.value, ty).unwrap_or_else(|e| {
                    diagnostics.push(Diagnostic::warning(
                        scope.clone(),
                        &machine_name,
                        Subject::property(key),
                        format!(
                            "cannot parse value of {} as {}: {}",
                            key,
                            e.expected.name(),
                            e.raw
                        ),
                    ));
                    PropValue::Untyped(folded.value.clone())
                });
                Resolved::Known {
                    value,
                    origin: ValueOrigin::Override,
                }
            }
        };
        values.insert(key.clone(), resolved);
    }

    for key in extra_keys {
        if !values.contains_key(key) {
            values.insert(key.clone(), resolve_default(snapshot, key));
        }
    }

    Resolution {
        state: EffectivePropertyState { values },
        diagnostics,
    }
}

/// A property name is unknown only if a fully introspected type lacks it
fn property_exists(dev: &DeviceTypeDescriptor, property: &str) -> bool {
    !dev.is_fully_introspected()
        || dev.declared(property).is_some()
        || dev.instance(property).is_some()
}

fn property_type(dev: &DeviceTypeDescriptor, property: &str) -> PropType {
    if let Some(declared) = dev.declared(property) {
        return PropType::of_declared(declared);
    }
    dev.instance(property)
        .and_then(|p| p.type_name.as_deref())
        .map(PropType::from_type_name)
        .unwrap_or(PropType::Unknown)
}

fn resolve_default(snapshot: &Snapshot, key: &PropKey) -> Resolved {
    let dev = match snapshot.device_type(&key.device) {
        None => return Resolved::UnknownNoInfo,
        Some(DeviceTypeRecord::NotCompiled { .. }) => return Resolved::DeviceAbsent,
        Some(DeviceTypeRecord::Present(dev)) => dev,
    };

    if let Some(declared) = dev.declared(&key.property) {
        return match &declared.defval {
            Some(defval) => Resolved::Known {
                value: PropValue::from_declared(declared, defval),
                origin: ValueOrigin::Default,
            },
            None => Resolved::UnknownNoInfo,
        };
    }

    if let Some(instance) = dev.instance(&key.property) {
        return match &instance.value {
            Some(value) => {
                let ty = instance
                    .type_name
                    .as_deref()
                    .map(PropType::from_type_name)
                    .unwrap_or(PropType::Unknown);
                Resolved::Known {
                    value: PropValue::from_json(value, ty),
                    origin: ValueOrigin::Instance,
                }
            }
            None => Resolved::UnknownIncomplete,
        };
    }

    if dev.is_fully_introspected() {
        Resolved::Invalid
    } else {
        Resolved::UnknownIncomplete
    }
}
