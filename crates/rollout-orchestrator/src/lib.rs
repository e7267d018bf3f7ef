#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! `OrchestratorClient`: the boundary to the external cluster/collaborator —
//! §6. The core depends only on this trait, never on a concrete client, so
//! the reconciler crate is exercised in tests against [`fake::FakeOrchestrator`]
//! without a real cluster.

pub mod fake;
mod types;

pub use types::{AnalysisArgs, AnalysisRunRef, AnalysisStatus, Labels};

use async_trait::async_trait;
use rollout_errors::OrchestratorError;
use rollout_events::EventReason;
use rollout_types::{ChildKey, ChildState, LifecycleState, RiderKey, RiderState, RolloutKey};
use serde_json::Value;

#[async_trait]
pub trait OrchestratorClient: Send + Sync {
    async fn get_child(&self, key: &ChildKey) -> Result<Option<ChildState>, OrchestratorError>;
    async fn create_child(&self, key: &ChildKey, spec: Value, labels: Labels) -> Result<(), OrchestratorError>;
    async fn patch_child(&self, key: &ChildKey, spec: Value, resource_version: &str) -> Result<(), OrchestratorError>;
    async fn delete_child(&self, key: &ChildKey) -> Result<(), OrchestratorError>;
    /// Updates only the upgrade-state label (§3, §4.F G3/G4 relabeling), leaving
    /// spec and other labels untouched.
    async fn relabel_child(&self, key: &ChildKey, lifecycle_state: LifecycleState) -> Result<(), OrchestratorError>;

    async fn get_rider(&self, key: &RiderKey) -> Result<Option<RiderState>, OrchestratorError>;
    async fn apply_rider(&self, key: &RiderKey, def: Value) -> Result<(), OrchestratorError>;
    async fn delete_rider(&self, key: &RiderKey) -> Result<(), OrchestratorError>;

    async fn create_analysis_run(
        &self,
        owner: &ChildKey,
        args: AnalysisArgs,
    ) -> Result<AnalysisRunRef, OrchestratorError>;
    async fn get_analysis_status(&self, run: &AnalysisRunRef) -> Result<AnalysisStatus, OrchestratorError>;

    async fn emit_event(&self, target: &RolloutKey, reason: EventReason, message: &str) -> Result<(), OrchestratorError>;
}
