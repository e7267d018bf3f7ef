//! Field-level configuration types, each with the same serde-default
//! discipline the teacher's `core.rs` uses: every field is independently
//! defaultable so a partial config file is valid.

use rollout_types::strategy::Strategy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ambient worker-pool sizing, not part of the distilled upgrade-strategy surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_max_concurrent_reconciles")]
    pub max_concurrent_reconciles: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            max_concurrent_reconciles: default_max_concurrent_reconciles(),
        }
    }
}

fn default_max_concurrent_reconciles() -> usize {
    10
}

/// Progressive-controller timing, §4.F.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressiveConfig {
    /// Grace period for an `Inconclusive` analysis result before rolling back,
    /// measured from the first-observed `Inconclusive`, not from G1 entry.
    #[serde(default = "default_inconclusive_grace_seconds")]
    pub inconclusive_grace_seconds: u64,
    /// How long a demoted (`Recyclable`) child survives before deletion.
    #[serde(default = "default_recycle_grace_seconds")]
    pub recycle_grace_seconds: u64,
}

impl Default for ProgressiveConfig {
    fn default() -> Self {
        Self {
            inconclusive_grace_seconds: default_inconclusive_grace_seconds(),
            recycle_grace_seconds: default_recycle_grace_seconds(),
        }
    }
}

fn default_inconclusive_grace_seconds() -> u64 {
    300
}

fn default_recycle_grace_seconds() -> u64 {
    60
}

/// A `(kind, group/version)` filter rule admitting a rider for deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceFilterRule {
    pub kind: String,
    pub group_version: String,
}

impl ResourceFilterRule {
    #[must_use]
    pub fn matches(&self, kind: &str, group_version: &str) -> bool {
        self.kind == kind && self.group_version == group_version
    }
}

/// Per-namespace override of the global default upgrade strategy.
/// Unrecognised override values fall back to the global default (the parse
/// happens at load time via [`crate::parse_strategy_field`]).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamespaceOverride {
    #[serde(default)]
    pub upgrade_strategy: Option<String>,
}

impl NamespaceOverride {
    /// Resolves the override, falling back to `None` (meaning "use the
    /// global default") on an unrecognised or absent value.
    #[must_use]
    pub fn resolved_strategy(&self) -> Option<Strategy> {
        self.upgrade_strategy
            .as_deref()
            .and_then(Strategy::parse_config_value)
    }
}

pub type NamespaceOverrides = BTreeMap<String, NamespaceOverride>;
