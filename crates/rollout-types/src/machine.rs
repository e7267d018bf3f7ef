//! Persisted sub-machine state for the two stateful upgrade strategies.
//!
//! `RolloutStatus` carries at most one of these at a time (whichever
//! `upgrade_in_progress` names); they survive across reconciles because
//! both sub-machines take many reconcile cycles to reach a terminal state.

use serde::{Deserialize, Serialize};

/// Pause-propagate-new-spec-drain sub-machine states, §4.E.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum PpndState {
    /// P0: about to publish a pause request.
    Idle,
    /// P1: pause request published, waiting for the child to report Paused.
    AwaitingPause,
    /// P2: child paused (or force-escaped), new spec being applied.
    Apply,
    /// P3: spec applied, resuming the child and releasing the pause request.
    Resume,
    /// P4: resumed, waiting for the child to report Running at the new generation.
    Verify,
}

/// Progressive rollout controller states, §4.F.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ProgressiveState {
    Idle,
    CreatingUpgrading,
    Analysing,
    Promoting,
    RollingBack,
}
