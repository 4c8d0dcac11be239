//! Pure reconciliation: active keys versus remote keys.
//!
//! One policy rule guards removals: a remote key is only ever a removal
//! candidate when it matches the managed key format. Manually curated
//! parameters are never touched, whatever the active set looks like.

use std::collections::BTreeSet;

use flagsync_core::keys::is_valid_flag_key;
use flagsync_core::types::FlagKey;

/// The exact additive/removal sets needed to converge the remote template
/// onto the active key set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReconcilePlan {
    /// Present in the active set, absent remotely.
    pub to_add: BTreeSet<FlagKey>,
    /// Present remotely, absent in the active set, and managed-format.
    pub to_remove: BTreeSet<FlagKey>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Compute the plan. `remote_keys` is the raw parameter key set of the
/// fetched template, manual keys included; comparison is case-sensitive
/// exact match on the canonical string form.
pub fn reconcile(active: &BTreeSet<FlagKey>, remote_keys: &BTreeSet<String>) -> ReconcilePlan {
    let to_add = active
        .iter()
        .filter(|key| !remote_keys.contains(&key.0))
        .cloned()
        .collect();
    let to_remove = remote_keys
        .iter()
        .filter(|key| is_valid_flag_key(key))
        .filter(|key| !active.contains(&FlagKey::from(key.as_str())))
        .map(|key| FlagKey::from(key.as_str()))
        .collect();
    ReconcilePlan { to_add, to_remove }
}
