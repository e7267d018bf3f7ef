//! In-progress strategy store — §4.D.
//!
//! Tracks the upgrade strategy each rollout is currently driving, so a
//! reconcile that resumes mid-PPND or mid-progressive knows which sub-machine
//! owns the rollout without re-deriving it from the classifier. Reseeded once
//! per rollout at startup from its persisted status.

use dashmap::DashMap;
use rollout_types::{RolloutKey, strategy::Strategy};
use std::sync::Arc;

#[derive(Clone)]
pub struct StrategyStore {
    in_progress: Arc<DashMap<RolloutKey, Strategy>>,
}

impl StrategyStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            in_progress: Arc::new(DashMap::new()),
        }
    }

    /// Seeds `key`'s entry from persisted status. Called once at startup per
    /// rollout; overwrites any stale in-memory entry left from a prior process.
    pub fn reseed(&self, key: RolloutKey, strategy: Strategy) {
        self.in_progress.insert(key, strategy);
    }

    /// Records that `key` is now driving `strategy`.
    pub fn set(&self, key: RolloutKey, strategy: Strategy) {
        self.in_progress.insert(key, strategy);
    }

    /// Clears the entry once a rollout has settled back to `NoOp`.
    pub fn clear(&self, key: &RolloutKey) {
        self.in_progress.remove(key);
    }

    #[must_use]
    pub fn get(&self, key: &RolloutKey) -> Option<Strategy> {
        self.in_progress.get(key).map(|r| *r)
    }
}

impl Default for StrategyStore {
    fn default() -> Self {
        Self::new()
    }
}
