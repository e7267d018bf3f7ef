#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for the rollout control plane
//!
//! This crate provides fine-grained error types organized by domain, one
//! module per component in `SPEC_FULL.md` §7.

pub mod config;
pub mod diff;
pub mod orchestrator;
pub mod progressive;
pub mod reconcile;
pub mod rider;
pub mod usde;

pub use config::ConfigError;
pub use diff::DiffError;
pub use orchestrator::OrchestratorError;
pub use progressive::ProgressiveError;
pub use reconcile::ReconcileError;
pub use rider::RiderError;
pub use usde::UsdeError;

use thiserror::Error;

/// Generic error type for cross-crate boundaries.
#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    #[error("diff error: {0}")]
    Diff(#[from] DiffError),

    #[error("usde error: {0}")]
    Usde(#[from] UsdeError),

    #[error("reconcile error: {0}")]
    Reconcile(#[from] ReconcileError),

    #[error("progressive error: {0}")]
    Progressive(#[from] ProgressiveError),

    #[error("rider error: {0}")]
    Rider(#[from] RiderError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("orchestrator error: {0}")]
    Orchestrator(#[from] OrchestratorError),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Transient errors are never surfaced as `phase = Failed`; the caller
    /// re-queues the reconcile instead (§7).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Orchestrator(e) => e.is_transient(),
            Self::Cancelled => true,
            _ => false,
        }
    }
}

/// Result type alias for rollout operations.
pub type Result<T> = std::result::Result<T, Error>;
