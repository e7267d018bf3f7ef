#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Process-wide singleton registries shared by every per-kind reconciler —
//! §4.C/4.D.
//!
//! Both the pause module and the in-progress strategy store are `DashMap`s
//! behind an `Arc`, following the same sharded-lock discipline
//! `crates/install`'s inflight/prepared-packages maps use for concurrent
//! single-flight bookkeeping: no coarse-grained `RwLock` guards the whole
//! table, each key's update is independent.

pub mod pause;
pub mod strategy_store;

pub use pause::PauseRegistry;
pub use strategy_store::StrategyStore;

/// Handed once to every per-kind reconciler worker. Cheap to `Clone`: both
/// fields are `Arc`-backed.
#[derive(Clone)]
pub struct Registry {
    pause: PauseRegistry,
    strategy: StrategyStore,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pause: PauseRegistry::new(),
            strategy: StrategyStore::new(),
        }
    }

    #[must_use]
    pub fn pause(&self) -> &PauseRegistry {
        &self.pause
    }

    #[must_use]
    pub fn strategy(&self) -> &StrategyStore {
        &self.strategy
    }

    /// No resources to release beyond `Drop`; exists for symmetry with the
    /// config store's documented teardown and is called from the CLI's
    /// shutdown path.
    pub fn shutdown(&self) {}
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
