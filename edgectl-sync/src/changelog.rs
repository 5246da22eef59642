//! The changelog — what has to change on the remote to match the local set.

use std::collections::BTreeMap;

/// One remote mutation derived from diffing desired against current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// The key exists locally but not remotely.
    Create { key: String, value: String },
    /// The key exists on both sides with different values.
    Update { key: String, value: String },
    /// The key exists remotely but not locally.
    Delete { key: String },
}

impl Change {
    pub fn key(&self) -> &str {
        match self {
            Change::Create { key, .. } | Change::Update { key, .. } | Change::Delete { key } => key,
        }
    }
}

/// Compute the changelog that turns `current` (remote state) into `desired`
/// (local state).
///
/// Keys equal on both sides emit nothing. Values are compared by exact string
/// equality; no normalisation of whitespace or case is done. The output order
/// is stable: creates and updates in key order, then deletes in key order.
pub fn diff(current: &BTreeMap<String, String>, desired: &BTreeMap<String, String>) -> Vec<Change> {
    let mut changes = Vec::new();

    for (key, value) in desired {
        match current.get(key) {
            None => changes.push(Change::Create {
                key: key.clone(),
                value: value.clone(),
            }),
            Some(existing) if existing != value => changes.push(Change::Update {
                key: key.clone(),
                value: value.clone(),
            }),
            Some(_) => {}
        }
    }

    for key in current.keys() {
        if !desired.contains_key(key) {
            changes.push(Change::Delete { key: key.clone() });
        }
    }

    changes
}
