//! Metadata diff: annotations and labels compared as string maps, excluding
//! controller-managed keys (§4.A "Metadata diff").

use std::collections::BTreeMap;

const HASH_ANNOTATION: &str = "numaflow.numaproj.io/rider-hash";
const INSTANCE_ID_ANNOTATION: &str = "numaflow.numaproj.io/instance-id";

/// Annotation keys the controller itself writes and which therefore never
/// count as a user-driven metadata change.
pub const MANAGED_ANNOTATION_KEYS: &[&str] = &[HASH_ANNOTATION, INSTANCE_ID_ANNOTATION];

/// Label keys the controller itself writes.
pub const MANAGED_LABEL_KEYS: &[&str] = &[
    "numaflow.numaproj.io/upgrade-state",
    "numaflow.numaproj.io/rollout-name",
];

/// Compares two metadata maps (already split into annotations and labels)
/// ignoring controller-managed keys, owner references, the instance-id
/// annotation and the upgrade-state label.
#[must_use]
pub fn metadata_needs_update(
    old_annotations: &BTreeMap<String, String>,
    new_annotations: &BTreeMap<String, String>,
    old_labels: &BTreeMap<String, String>,
    new_labels: &BTreeMap<String, String>,
) -> bool {
    map_differs(old_annotations, new_annotations, MANAGED_ANNOTATION_KEYS)
        || map_differs(old_labels, new_labels, MANAGED_LABEL_KEYS)
}

fn map_differs(a: &BTreeMap<String, String>, b: &BTreeMap<String, String>, excluded: &[&str]) -> bool {
    let keys: std::collections::BTreeSet<&String> = a
        .keys()
        .chain(b.keys())
        .filter(|k| !excluded.contains(&k.as_str()))
        .collect();
    keys.into_iter().any(|k| a.get(k) != b.get(k))
}
