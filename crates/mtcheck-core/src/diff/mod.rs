//! Pairwise comparison of one machine type across two snapshots.

pub mod engine;
pub mod model;

pub use engine::{compare_machine, compare_machine_detailed, MachineComparison};
pub use model::{Diagnostic, Scope, Severity, Subject};
