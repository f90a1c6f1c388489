//! Comparison engine for one machine type across two snapshots.
//!
//! Compares machine fields, then every property either side overrides.

use crate::config::CheckerConfig;
use crate::diff::model::{Diagnostic, Scope, Subject};
use crate::resolve::{resolve_machine, PropKey, Resolved};
use crate::snapshot::model::{MachineDescriptor, Snapshot};
use crate::{log_op_end, log_op_start};
use mtcheck_core_types::{MachineName, SnapshotRef};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

/// A field whose `0` means "no limit given", equivalent to `1`
const MAX_CPUS_FIELD: &str = "max_cpus";

/// Result of comparing one machine across a pair of snapshots
#[derive(Debug, Clone, Default)]
pub struct MachineComparison {
    /// Findings about the pair
    pub diagnostics: Vec<Diagnostic>,
    /// Resolver findings about the older snapshot alone
    pub older_lints: Vec<Diagnostic>,
    /// Resolver findings about the newer snapshot alone
    pub newer_lints: Vec<Diagnostic>,
}

/// Compare `machine` in `older` and `newer`, returning the pair findings.
///
/// Returns nothing when either snapshot lacks the machine.
pub fn compare_machine(
    older: &Snapshot,
    newer: &Snapshot,
    machine: &str,
    config: &CheckerConfig,
) -> Vec<Diagnostic> {
    compare_machine_detailed(older, newer, machine, config).diagnostics
}

/// Like [`compare_machine`], also handing back each side's resolver lints.
pub fn compare_machine_detailed(
    older: &Snapshot,
    newer: &Snapshot,
    machine: &str,
    config: &CheckerConfig,
) -> MachineComparison {
    log_op_start!(
        "compare_machine",
        machine = machine,
        older = older.reference().label(),
        newer = newer.reference().label()
    );
    let start = Instant::now();

    let comparison = match (older.machine(machine), newer.machine(machine)) {
        (Some(a), Some(b)) => compare_descriptors(older, a, newer, b, config),
        _ => MachineComparison::default(),
    };

    log_op_end!(
        "compare_machine",
        duration_ms = start.elapsed().as_millis() as u64,
        machine = machine,
        diagnostic_count = comparison.diagnostics.len() as u64
    );
    comparison
}

fn compare_descriptors(
    older: &Snapshot,
    a: &MachineDescriptor,
    newer: &Snapshot,
    b: &MachineDescriptor,
    config: &CheckerConfig,
) -> MachineComparison {
    let pair = Pair {
        scope: Scope::Pair {
            older: older.reference().clone(),
            newer: newer.reference().clone(),
        },
        machine: MachineName::from(a.name.as_str()),
        older: older.reference(),
        newer: newer.reference(),
    };

    let mut diagnostics = compare_fields(&pair, a, b, config);

    let keys_a = override_keys(a);
    let keys_b = override_keys(b);
    let res_a = resolve_machine(older, a, &keys_b);
    let res_b = resolve_machine(newer, b, &keys_a);

    for key in keys_a.union(&keys_b) {
        let (Some(va), Some(vb)) = (res_a.state.get(key), res_b.state.get(key)) else {
            continue;
        };
        diagnostics.extend(compare_property(&pair, key, va, vb));
    }

    MachineComparison {
        diagnostics,
        older_lints: res_a.diagnostics,
        newer_lints: res_b.diagnostics,
    }
}

struct Pair<'a> {
    scope: Scope,
    machine: MachineName,
    older: &'a SnapshotRef,
    newer: &'a SnapshotRef,
}

impl Pair<'_> {
    fn error(&self, subject: Subject, message: String) -> Diagnostic {
        Diagnostic::error(self.scope.clone(), &self.machine, subject, message)
    }

    fn warning(&self, subject: Subject, message: String) -> Diagnostic {
        Diagnostic::warning(self.scope.clone(), &self.machine, subject, message)
    }
}

fn override_keys(machine: &MachineDescriptor) -> BTreeSet<PropKey> {
    machine
        .compat_props
        .iter()
        .map(|o| PropKey::new(o.driver.as_str(), o.property.as_str()))
        .collect()
}

fn compare_fields(
    pair: &Pair<'_>,
    a: &MachineDescriptor,
    b: &MachineDescriptor,
    config: &CheckerConfig,
) -> Vec<Diagnostic> {
    let scalars = |m: &MachineDescriptor| -> BTreeMap<String, Value> {
        m.scalar_fields()
            .filter(|(name, _)| !config.is_ignored(name))
            .map(|(name, value)| (name.to_string(), normalize_field(name, value)))
            .collect()
    };
    let fields_a = scalars(a);
    let fields_b = scalars(b);
    let names: BTreeSet<&String> = fields_a.keys().chain(fields_b.keys()).collect();

    let mut out = Vec::new();
    for name in names {
        let subject = Subject::MachineField {
            field: name.clone(),
        };
        match (fields_a.get(name), fields_b.get(name)) {
            (Some(va), Some(vb)) if va != vb => out.push(pair.error(
                subject,
                format!(
                    "difference at machine.{} ({} != {})",
                    name,
                    render_scalar(va),
                    render_scalar(vb)
                ),
            )),
            (Some(_), None) => out.push(pair.warning(
                subject,
                format!(
                    "I don't know how to deal with missing {} field (absent in {})",
                    name, pair.newer
                ),
            )),
            (None, Some(_)) => out.push(pair.warning(
                subject,
                format!(
                    "I don't know how to deal with missing {} field (absent in {})",
                    name, pair.older
                ),
            )),
            _ => {}
        }
    }
    out
}

fn normalize_field(name: &str, value: &Value) -> Value {
    if name == MAX_CPUS_FIELD && value.as_u64() == Some(0) {
        return Value::from(1);
    }
    value.clone()
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn compare_property(
    pair: &Pair<'_>,
    key: &PropKey,
    a: &Resolved,
    b: &Resolved,
) -> Vec<Diagnostic> {
    // the feature is not in one of the builds at all
    if matches!(a, Resolved::DeviceAbsent) || matches!(b, Resolved::DeviceAbsent) {
        return Vec::new();
    }

    if let (Some(va), Some(vb)) = (a.known_value(), b.known_value()) {
        if va.matches(vb) {
            return Vec::new();
        }
        return vec![pair.error(
            Subject::property(key),
            format!("difference at {} ({} != {})", key, va, vb),
        )];
    }

    [(pair.older, a), (pair.newer, b)]
        .into_iter()
        .filter_map(|(side, resolved)| {
            let subject = Subject::property(key);
            match resolved {
                Resolved::Invalid => Some(pair.error(
                    subject,
                    format!("Invalid property: {} (in {})", key, side),
                )),
                Resolved::UnknownNoInfo => Some(pair.warning(
                    subject,
                    format!("I don't know the default value of {} (in {})", key, side),
                )),
                Resolved::UnknownIncomplete => Some(pair.warning(
                    subject,
                    format!("Not enough info to validate property: {} (in {})", key, side),
                )),
                Resolved::Known { .. } | Resolved::DeviceAbsent => None,
            }
        })
        .collect()
}
