//! Property resolver.
//!
//! Computes the effective value of every compat-relevant property of a
//! machine in one snapshot: the machine's own overrides first, then the
//! device type's declared defaults, with a confidence tag saying how much
//! the snapshot actually knows.

pub mod fold;
pub mod resolver;
pub mod value;

pub use fold::{fold_overrides, DuplicateOverride, FoldedOverride, OverrideFold, PropKey};
pub use resolver::{
    resolve_machine, EffectivePropertyState, Resolution, Resolved, ValueOrigin,
};
pub use value::{PropType, PropValue, ValueParseError};
