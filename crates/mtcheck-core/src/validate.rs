//! Sequence validation over an ordered list of snapshots.
//!
//! Every earlier snapshot is compared with every later one, not only its
//! neighbour: a regression between builds 1 and 3 must surface even when
//! 1-2 and 2-3 each look fine.

use crate::config::CheckerConfig;
use crate::diff::{compare_machine_detailed, Diagnostic};
use crate::snapshot::model::Snapshot;
use crate::{log_op_end, log_op_start};
use std::collections::BTreeSet;
use std::time::Instant;

/// Compare all pairs `(i, j)` with `i < j`, in order.
///
/// Within a pair, machines follow the older snapshot's record order and are
/// restricted to `machine_filter` when given. Resolver lints for a
/// `(snapshot, machine)` are reported once, the first time it is visited.
pub fn validate_sequence(
    snapshots: &[Snapshot],
    config: &CheckerConfig,
    machine_filter: Option<&BTreeSet<String>>,
) -> Vec<Diagnostic> {
    log_op_start!("validate_sequence", snapshot_count = snapshots.len() as u64);
    let start = Instant::now();

    if snapshots.len() < 2 {
        tracing::info!(
            snapshot_count = snapshots.len() as u64,
            "fewer than two snapshots, nothing to compare"
        );
    }

    let mut diagnostics = Vec::new();
    let mut linted: BTreeSet<(usize, String)> = BTreeSet::new();
    let mut comparisons: u64 = 0;

    for (i, older) in snapshots.iter().enumerate() {
        for (j, newer) in snapshots.iter().enumerate().skip(i + 1) {
            for machine in older.machines() {
                let name = machine.name.as_str();
                if machine_filter.is_some_and(|f| !f.contains(name)) {
                    continue;
                }
                if newer.machine(name).is_none() {
                    tracing::debug!(
                        machine = name,
                        older = older.reference().label(),
                        newer = newer.reference().label(),
                        "machine absent from newer snapshot, skipped"
                    );
                    continue;
                }

                let cmp = compare_machine_detailed(older, newer, name, config);
                comparisons += 1;
                if linted.insert((i, name.to_string())) {
                    diagnostics.extend(cmp.older_lints);
                }
                if linted.insert((j, name.to_string())) {
                    diagnostics.extend(cmp.newer_lints);
                }
                diagnostics.extend(cmp.diagnostics);
            }
        }
    }

    log_op_end!(
        "validate_sequence",
        duration_ms = start.elapsed().as_millis() as u64,
        comparisons = comparisons,
        diagnostic_count = diagnostics.len() as u64
    );
    diagnostics
}
