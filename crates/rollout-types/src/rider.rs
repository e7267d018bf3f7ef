//! Auxiliary resources declared alongside a child and co-owned with it.

use serde::{Deserialize, Serialize};

/// `(name, kind, group/version)` identity of a rider resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RiderKey {
    pub name: String,
    pub kind: String,
    pub group_version: String,
}

/// A rider declaration carried on a rollout spec. `requires_progressive`
/// marks riders that must be duplicated onto the Upgrading child during a
/// progressive rollout rather than shared with the Promoted child.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rider {
    pub key: RiderKey,
    pub definition: serde_json::Value,
    pub requires_progressive: bool,
}

/// Observed state of a rider as read back from the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiderState {
    pub key: RiderKey,
    pub definition: serde_json::Value,
    pub stored_hash: String,
    pub resource_version: String,
}
