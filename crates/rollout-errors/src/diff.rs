//! Path-diff engine error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum DiffError {
    #[error("excluded path is empty")]
    EmptyPath,

    #[error("excluded path segment is empty in {path}")]
    EmptyPathSegment { path: String },
}
