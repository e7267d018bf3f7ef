//! Child workload identity and observed lifecycle state.

use crate::rollout::{NamespacedName, RolloutKind};
use serde::{Deserialize, Serialize};

/// Lifecycle label a child (or a rider) carries. Exactly one `Promoted` child
/// exists per rollout once `phase == Deployed`; at most one `Upgrading` child
/// ever exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum LifecycleState {
    Promoted,
    Upgrading,
    Recyclable,
}

/// Identity of a child workload resource: `(namespace, name, kind)`, where
/// `name = "{rollout-name}-{instance_id}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChildKey {
    pub namespaced_name: NamespacedName,
    pub kind: RolloutKind,
}

impl ChildKey {
    #[must_use]
    pub fn for_instance(rollout_name: &str, instance_id: u32, namespace: &str, kind: RolloutKind) -> Self {
        Self {
            namespaced_name: NamespacedName::new(namespace, format!("{rollout_name}-{instance_id}")),
            kind,
        }
    }
}

/// A rollout's reference to one of its children, carried in `status.children`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildRef {
    pub key: ChildKey,
    pub state: LifecycleState,
}

/// Data-plane lifecycle phases a Numaflow-style child reports, consumed by
/// the PPND sub-machine and the progressive controller's healthy predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ChildStatus {
    Pending,
    Deployed,
    Healthy,
    Pausing,
    Paused,
    Running,
    Failed,
}

/// Observed state of a child as read back from the orchestrator: its spec,
/// status and the bookkeeping needed for optimistic updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildState {
    pub key: ChildKey,
    pub spec: serde_json::Value,
    pub annotations: std::collections::BTreeMap<String, String>,
    pub labels: std::collections::BTreeMap<String, String>,
    pub status: ChildStatus,
    pub generation: i64,
    pub observed_generation: i64,
    pub resource_version: String,
    pub lifecycle_state: LifecycleState,
    /// Owner rollout, used to detect a name collision with a non-owned resource.
    pub owner: Option<crate::rollout::RolloutKey>,
}

impl ChildState {
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        matches!(self.status, ChildStatus::Healthy | ChildStatus::Running)
    }

    #[must_use]
    pub fn is_owned_by(&self, rollout: &crate::rollout::RolloutKey) -> bool {
        self.owner.as_ref() == Some(rollout)
    }
}
