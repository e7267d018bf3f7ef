//! Per-kind behaviour injected into the generic reconciler — §9 "Rollout-kind
//! polymorphism": the four rollout kinds share one state machine but differ
//! in their healthy predicate, their desired-phase field, and which excluded
//! paths apply. Named `KindProfile` rather than `RolloutKind` to avoid
//! colliding with `rollout_types::RolloutKind`, the plain identity tag.

use rollout_config::Config;
use rollout_types::{ChildStatus, RolloutKind};

pub trait KindProfile: Send + Sync {
    fn kind(&self) -> RolloutKind;

    /// Whether this child reports itself ready to serve traffic.
    fn healthy(&self, status: ChildStatus) -> bool;

    /// Whether this kind supports the PPND pause/resume lifecycle at all.
    fn pausable(&self) -> bool;

    /// Dot-path within the child spec carrying the desired lifecycle phase,
    /// e.g. `"lifecycle.desiredPhase"`. Empty when `pausable()` is `false`.
    fn desired_phase_field(&self) -> &'static str;

    /// The kind-specific excluded-paths list from config (§4.B).
    fn excluded_paths<'a>(&self, config: &'a Config) -> &'a [String] {
        config.excluded_paths_for(self.kind())
    }
}

pub struct PipelineProfile;
pub struct IsbServiceProfile;
pub struct MonoVertexProfile;
pub struct NumaflowControllerProfile;

impl KindProfile for PipelineProfile {
    fn kind(&self) -> RolloutKind {
        RolloutKind::PipelineRollout
    }
    fn healthy(&self, status: ChildStatus) -> bool {
        matches!(status, ChildStatus::Healthy | ChildStatus::Running)
    }
    fn pausable(&self) -> bool {
        true
    }
    fn desired_phase_field(&self) -> &'static str {
        "lifecycle.desiredPhase"
    }
}

impl KindProfile for IsbServiceProfile {
    fn kind(&self) -> RolloutKind {
        RolloutKind::IsbServiceRollout
    }
    fn healthy(&self, status: ChildStatus) -> bool {
        matches!(status, ChildStatus::Healthy | ChildStatus::Running)
    }
    fn pausable(&self) -> bool {
        true
    }
    fn desired_phase_field(&self) -> &'static str {
        "lifecycle.desiredPhase"
    }
}

impl KindProfile for MonoVertexProfile {
    fn kind(&self) -> RolloutKind {
        RolloutKind::MonoVertexRollout
    }
    fn healthy(&self, status: ChildStatus) -> bool {
        matches!(status, ChildStatus::Healthy | ChildStatus::Running)
    }
    fn pausable(&self) -> bool {
        true
    }
    fn desired_phase_field(&self) -> &'static str {
        "lifecycle.desiredPhase"
    }
}

/// The numaflow controller rollout has no data plane to pause or drain: it
/// tracks a single Deployment-like resource, so `Deployed` already counts as
/// healthy and PPND never applies to it.
impl KindProfile for NumaflowControllerProfile {
    fn kind(&self) -> RolloutKind {
        RolloutKind::NumaflowControllerRollout
    }
    fn healthy(&self, status: ChildStatus) -> bool {
        matches!(status, ChildStatus::Deployed | ChildStatus::Healthy | ChildStatus::Running)
    }
    fn pausable(&self) -> bool {
        false
    }
    fn desired_phase_field(&self) -> &'static str {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controller_profile_is_not_pausable() {
        assert!(!NumaflowControllerProfile.pausable());
        assert!(PipelineProfile.pausable());
    }

    #[test]
    fn controller_profile_treats_deployed_as_healthy() {
        assert!(NumaflowControllerProfile.healthy(ChildStatus::Deployed));
        assert!(!PipelineProfile.healthy(ChildStatus::Deployed));
    }
}
