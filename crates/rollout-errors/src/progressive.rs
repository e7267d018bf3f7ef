//! Progressive controller error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ProgressiveError {
    #[error("analysis template reference {name} not found in namespace {namespace}")]
    TemplateNotFound { name: String, namespace: String },

    /// Analysis run reported `Failed`/`Inconclusive` past grace. This is
    /// *not* a `Failed` phase — rollback (G4) is normal operation (§7) — so
    /// this variant exists for logging/diagnostics only and is never
    /// converted to `ReconcileError`.
    #[error("analysis run {name} did not pass: {status}")]
    AnalysisDidNotPass { name: String, status: String },

    #[error("rollout has two children neither of which is labelled Upgrading")]
    MissingUpgradingChild,
}
