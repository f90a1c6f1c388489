//! Override fold.
//!
//! A machine's compat property list is reduced, in order, into one value per
//! `(driver, property)` key. Reassigning a key to a different value is the
//! normal way versions tighten their overrides and is silent; reassigning it
//! to the value it already holds is redundant and gets recorded.

use crate::snapshot::model::CompatOverride;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// `(device type, property)` key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PropKey {
    pub device: String,
    pub property: String,
}

impl PropKey {
    pub fn new(device: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            property: property.into(),
        }
    }
}

impl fmt::Display for PropKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.device, self.property)
    }
}

/// A reassignment to the value the key already held
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateOverride {
    pub key: PropKey,
    pub value: String,
    /// Position of the redundant entry in the override list
    pub position: usize,
}

/// Final value for one key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldedOverride {
    pub value: String,
    /// Position of the entry that set the final value
    pub position: usize,
    /// Whether a redundant reassignment happened along the way
    pub had_duplicate: bool,
}

/// Result of folding one machine's override list
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OverrideFold {
    pub values: BTreeMap<PropKey, FoldedOverride>,
    /// Redundant reassignments, in list order
    pub duplicates: Vec<DuplicateOverride>,
}

/// Fold an ordered override list into its final mapping
pub fn fold_overrides(overrides: &[CompatOverride]) -> OverrideFold {
    overrides
        .iter()
        .enumerate()
        .fold(OverrideFold::default(), |mut acc, (position, cp)| {
            let key = PropKey::new(cp.driver.as_str(), cp.property.as_str());
            let repeated = acc
                .values
                .get(&key)
                .is_some_and(|prev| prev.value == cp.value);
            if repeated {
                acc.duplicates.push(DuplicateOverride {
                    key: key.clone(),
                    value: cp.value.clone(),
                    position,
                });
            }
            let had_duplicate =
                repeated || acc.values.get(&key).is_some_and(|prev| prev.had_duplicate);
            acc.values.insert(
                key,
                FoldedOverride {
                    value: cp.value.clone(),
                    position,
                    had_duplicate,
                },
            );
            acc
        })
}
