//! Strategy classifier error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum UsdeError {
    /// A per-namespace user preference named a strategy the config layer
    /// does not recognize. Policy errors of this kind are logged and the
    /// classifier falls back to the configured default (§7).
    #[error("invalid user preference strategy: {value}")]
    InvalidPreference { value: String },
}
