//! Rollout reconciler error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ReconcileError {
    #[error("desired spec is malformed: {reason}")]
    MalformedSpec { reason: String },

    #[error("child {name} already exists and is not owned by this rollout")]
    NameCollision { name: String },

    #[error("rollout {rollout} has no child named {child}")]
    ChildNotFound { rollout: String, child: String },

    #[error("unexpected phase transition from {from:?} to {to:?}")]
    InvalidTransition { from: String, to: String },
}

impl ReconcileError {
    /// Spec-derived errors surface as `phase = Failed`; everything else is
    /// an implementation bug and should not reach this boundary.
    #[must_use]
    pub fn is_spec_derived(&self) -> bool {
        matches!(self, Self::MalformedSpec { .. } | Self::NameCollision { .. })
    }
}
