//! Rollout identity and observed status.

use crate::child::ChildRef;
use crate::machine::{PpndState, ProgressiveState};
use crate::strategy::Strategy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four rollout kinds the operator reconciles. Each shares the same
/// state machine but differs in its healthy predicate, desired-phase field
/// name and rider semantics (see `rollout_usde`/`rollout_reconcile`'s
/// `RolloutKind` capability trait, not to be confused with this tag).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum RolloutKind {
    PipelineRollout,
    IsbServiceRollout,
    NumaflowControllerRollout,
    MonoVertexRollout,
}

impl fmt::Display for RolloutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::PipelineRollout => "PipelineRollout",
            Self::IsbServiceRollout => "ISBServiceRollout",
            Self::NumaflowControllerRollout => "NumaflowControllerRollout",
            Self::MonoVertexRollout => "MonoVertexRollout",
        };
        write!(f, "{s}")
    }
}

/// `(namespace, name)` pair, the identity shared by rollouts, children and riders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NamespacedName {
    pub namespace: String,
    pub name: String,
}

impl NamespacedName {
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for NamespacedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Full identity of a rollout: `(namespace, name, kind)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RolloutKey {
    pub namespaced_name: NamespacedName,
    pub kind: RolloutKind,
}

impl RolloutKey {
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, kind: RolloutKind) -> Self {
        Self {
            namespaced_name: NamespacedName::new(namespace, name),
            kind,
        }
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespaced_name.namespace
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.namespaced_name.name
    }
}

impl fmt::Display for RolloutKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.namespaced_name)
    }
}

/// Rollout phase, per §3 of the data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Phase {
    Pending,
    Deployed,
    Failed,
}

/// Observed status of a rollout resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolloutStatus {
    pub phase: Phase,
    pub observed_generation: i64,
    pub upgrade_in_progress: Strategy,
    pub children: Vec<ChildRef>,
    /// Human-readable reason set when `phase == Failed`.
    pub reason: Option<String>,
    /// Set iff `upgrade_in_progress == Ppnd`.
    pub ppnd_state: Option<PpndState>,
    /// Set iff `upgrade_in_progress == Progressive`.
    pub progressive_state: Option<ProgressiveState>,
    /// Name of the analysis run created for the current progressive rollout, if any.
    pub analysis_run_name: Option<String>,
    /// First time an analysis run was observed `Inconclusive`; the grace period is
    /// measured from here, not from G1 entry.
    pub analysis_inconclusive_since: Option<chrono::DateTime<chrono::Utc>>,
    /// When the demoted child becomes eligible for deletion, set once G3 relabeling completes.
    pub recycle_deadline: Option<chrono::DateTime<chrono::Utc>>,
}

impl RolloutStatus {
    #[must_use]
    pub fn pending() -> Self {
        Self {
            phase: Phase::Pending,
            observed_generation: 0,
            upgrade_in_progress: Strategy::NoOp,
            children: Vec::new(),
            reason: None,
            ppnd_state: None,
            progressive_state: None,
            analysis_run_name: None,
            analysis_inconclusive_since: None,
            recycle_deadline: None,
        }
    }

    /// The invariant `observed_generation <= generation`, and equal only when Deployed.
    #[must_use]
    pub fn is_generation_consistent(&self, generation: i64) -> bool {
        if self.observed_generation > generation {
            return false;
        }
        if self.observed_generation == generation {
            return true;
        }
        self.phase != Phase::Deployed
    }

    /// `upgrade_in_progress in {PPND, Progressive}` implies `phase == Pending`.
    #[must_use]
    pub fn respects_pending_invariant(&self) -> bool {
        match self.upgrade_in_progress {
            Strategy::Ppnd | Strategy::Progressive => self.phase == Phase::Pending,
            Strategy::NoOp | Strategy::Apply => true,
        }
    }
}

/// A generic rollout resource. The desired spec is kept opaque (`serde_json::Value`)
/// since its shape is entirely kind-specific; only the classifier and reconciler
/// capability record need to interpret it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rollout {
    pub key: RolloutKey,
    pub generation: i64,
    pub spec: serde_json::Value,
    pub annotations: std::collections::BTreeMap<String, String>,
    pub labels: std::collections::BTreeMap<String, String>,
    pub status: RolloutStatus,
}

impl Rollout {
    /// Reads the allow-data-loss annotation. Any present, non-empty, non-"false"
    /// value is treated as truthy, matching the original's tolerant parsing of a
    /// free-form annotation value.
    #[must_use]
    pub fn allow_data_loss(&self) -> bool {
        self.annotations
            .get(crate::ANNOTATION_ALLOW_DATA_LOSS)
            .is_some_and(|v| {
                let v = v.trim();
                !v.is_empty() && !v.eq_ignore_ascii_case("false")
            })
    }

    /// Reads the instance-id annotation, defaulting to `0` when absent or unparsable.
    #[must_use]
    pub fn instance_id(&self) -> u32 {
        self.annotations
            .get(crate::ANNOTATION_INSTANCE_ID)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }
}
