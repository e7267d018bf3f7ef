//! Orchestrator client error types — the boundary described in §6.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum OrchestratorError {
    #[error("{kind}/{name} not found in namespace {namespace}")]
    NotFound {
        kind: String,
        namespace: String,
        name: String,
    },

    #[error("optimistic concurrency conflict updating {kind}/{name}")]
    Conflict { kind: String, name: String },

    #[error("orchestrator API unreachable: {message}")]
    Unavailable { message: String },

    #[error("malformed resource returned by orchestrator: {message}")]
    Malformed { message: String },
}

impl OrchestratorError {
    /// Transient I/O: not surfaced to the user; the reconcile re-queues (§7).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Conflict { .. } | Self::Unavailable { .. })
    }
}
