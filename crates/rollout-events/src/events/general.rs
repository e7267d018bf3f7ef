//! General utility events — warnings, debug traces, policy fallbacks.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GeneralEvent {
    Debug { message: String },
    DebugWithContext { message: String, context: HashMap<String, String> },
    Warning { message: String },
    /// A user-forbidden or unrecognized upgrade strategy preference fell
    /// back to the configured default (§7 policy errors).
    PolicyFallback { namespace: String, requested: String, fallback: String },
}

impl GeneralEvent {
    #[must_use]
    pub fn debug(message: impl Into<String>) -> Self {
        Self::Debug { message: message.into() }
    }

    #[must_use]
    pub fn debug_with_context(message: impl Into<String>, context: HashMap<String, String>) -> Self {
        Self::DebugWithContext { message: message.into(), context }
    }

    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning { message: message.into() }
    }
}
