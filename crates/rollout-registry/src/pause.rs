//! Process-wide pause-request registry — §4.C.
//!
//! Keyed by the dependency a rollout's PPND sub-machine needs paused (an
//! interstep buffer service, a controller). Contributors publish their
//! opinion by overwriting the entry for their key; since the key already
//! names a single target dependency, there is nothing to fan in across
//! contributors beyond "whatever was written last wins" — two rollouts
//! sharing a target serialise by observing each other's write across
//! reconcile cycles, not through a lock.

use dashmap::DashMap;
use rollout_types::strategy::{PauseKey, TriState};
use std::sync::Arc;

#[derive(Clone)]
pub struct PauseRegistry {
    requests: Arc<DashMap<PauseKey, TriState>>,
}

impl PauseRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            requests: Arc::new(DashMap::new()),
        }
    }

    /// Publishes this contributor's opinion for `key`, overwriting any prior one.
    pub fn set(&self, key: PauseKey, state: TriState) {
        self.requests.insert(key, state);
    }

    /// Withdraws any opinion for `key`, equivalent to never having set one.
    pub fn clear(&self, key: &PauseKey) {
        self.requests.remove(key);
    }

    /// Aggregated pause decision for `key`: paused iff an opinion is on file
    /// and it is `True`. Absent or `Unset` both read as "not paused".
    #[must_use]
    pub fn is_paused(&self, key: &PauseKey) -> bool {
        matches!(self.requests.get(key).map(|r| *r), Some(TriState::True))
    }
}

impl Default for PauseRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollout_types::RolloutKind;

    fn key() -> PauseKey {
        PauseKey::new(RolloutKind::IsbServiceRollout, "ns", "isbsvc-default")
    }

    #[test]
    fn absent_key_reads_as_not_paused() {
        let registry = PauseRegistry::new();
        assert!(!registry.is_paused(&key()));
    }

    #[test]
    fn true_reads_as_paused() {
        let registry = PauseRegistry::new();
        registry.set(key(), TriState::True);
        assert!(registry.is_paused(&key()));
    }

    #[test]
    fn unset_reads_as_not_paused() {
        let registry = PauseRegistry::new();
        registry.set(key(), TriState::Unset);
        assert!(!registry.is_paused(&key()));
    }

    #[test]
    fn release_after_pause_clears_the_decision() {
        let registry = PauseRegistry::new();
        registry.set(key(), TriState::True);
        registry.set(key(), TriState::False);
        assert!(!registry.is_paused(&key()));
    }

    #[test]
    fn clear_withdraws_the_opinion_entirely() {
        let registry = PauseRegistry::new();
        registry.set(key(), TriState::True);
        registry.clear(&key());
        assert!(!registry.is_paused(&key()));
    }

    #[test]
    fn distinct_targets_do_not_interfere() {
        let registry = PauseRegistry::new();
        let other = PauseKey::new(RolloutKind::IsbServiceRollout, "ns", "isbsvc-other");
        registry.set(key(), TriState::True);
        assert!(!registry.is_paused(&other));
    }
}
