//! Reconciler domain events — orchestrator event reasons from §6.

use rollout_types::rollout::RolloutKey;
use serde::{Deserialize, Serialize};

/// The seven event reasons the core emits against a rollout object (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum EventReason {
    Deployed,
    Updating,
    Pausing,
    Resuming,
    Promoting,
    RollingBack,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReconcileEvent {
    /// A reconcile cycle began for a rollout.
    Started { rollout: RolloutKey },

    /// An orchestrator event was emitted against the rollout object.
    Reason {
        rollout: RolloutKey,
        reason: EventReason,
        message: String,
    },

    /// The reconcile completed successfully.
    Completed { rollout: RolloutKey },

    /// The reconcile hit a transient error and will be re-queued.
    Requeued { rollout: RolloutKey, reason: String },

    /// A worker caught a panic from a reconcile body and re-queued the item.
    PanicRecovered { rollout: RolloutKey, message: String },
}
