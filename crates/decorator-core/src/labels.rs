//! Desired label computation and the in-place label diff.
//!
//! Only keys under the identity prefix and the tags prefix are ever written or
//! removed; every other label on the node passes through untouched.
use std::collections::BTreeMap;

use decorator_model::{
    IDENTITY_HOST, IDENTITY_INSTANCE_ID, IDENTITY_INSTANCE_TYPE, IDENTITY_LABEL, IDENTITY_REGION,
    InstanceData, LabelPrefix, Labels,
};

/// Build the five identity labels for an instance.
pub fn identity_labels(prefix: &LabelPrefix, data: &InstanceData) -> Labels {
    let mut labels = Labels::new();
    labels
        .insert(prefix.key(IDENTITY_LABEL), data.label.as_str())
        .insert(prefix.key(IDENTITY_INSTANCE_ID), data.id.to_string())
        .insert(prefix.key(IDENTITY_REGION), data.region.as_str())
        .insert(prefix.key(IDENTITY_INSTANCE_TYPE), data.instance_type.as_str())
        .insert(prefix.key(IDENTITY_HOST), data.host_uuid.as_str());
    labels
}

/// Keys touched by one [`apply_labels`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelChanges {
    /// Keys that were added or whose value changed.
    pub set: Vec<String>,
    /// Stale tag keys that were deleted.
    pub removed: Vec<String>,
}

impl LabelChanges {
    /// Returns `true` when nothing was mutated and no write is needed.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.removed.is_empty()
    }
}

/// Converge `current` toward the desired identity and tag labels.
///
/// Order of operations:
/// 1. identity labels are set when absent or different;
/// 2. keys starting with `tags_key_prefix` that are not in `tags` are removed;
/// 3. tag labels are set when absent or different.
///
/// Returns the keys that changed. An empty result means the node is already
/// up to date and must not be written back.
pub fn apply_labels(
    current: &mut BTreeMap<String, String>,
    identity: &Labels,
    tags: &Labels,
    tags_key_prefix: &str,
) -> LabelChanges {
    let mut changes = LabelChanges::default();

    for (key, value) in identity.iter() {
        if set_label(current, key, value) {
            changes.set.push(key.to_string());
        }
    }

    current.retain(|key, _| {
        let stale = key.starts_with(tags_key_prefix) && !tags.contains_key(key);
        if stale {
            changes.removed.push(key.clone());
        }
        !stale
    });

    for (key, value) in tags.iter() {
        if set_label(current, key, value) {
            changes.set.push(key.to_string());
        }
    }

    changes
}

fn set_label(labels: &mut BTreeMap<String, String>, key: &str, value: &str) -> bool {
    match labels.get(key) {
        Some(old) if old == value => false,
        _ => {
            labels.insert(key.to_string(), value.to_string());
            true
        }
    }
}
