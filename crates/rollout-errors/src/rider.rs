//! Rider attachment error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum RiderError {
    #[error("rider {kind}/{name} is not a permitted group/kind")]
    Forbidden { kind: String, name: String },

    #[error("rider {kind}/{name} declared twice in the same rollout")]
    DuplicateDeclaration { kind: String, name: String },
}
