//! In-memory [`OrchestratorClient`] used by every test in `rollout-reconcile`.
//! Keeps behaviour honest about the two properties reconciles depend on:
//! optimistic concurrency (`patch_child` rejects a stale `resource_version`)
//! and idempotent deletes.

use crate::{AnalysisArgs, AnalysisRunRef, AnalysisStatus, Labels, OrchestratorClient};
use async_trait::async_trait;
use dashmap::DashMap;
use rollout_errors::OrchestratorError;
use rollout_events::EventReason;
use rollout_types::{ChildKey, ChildState, ChildStatus, LifecycleState, RiderKey, RiderState, RolloutKey, ANNOTATION_RIDER_HASH};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub target: RolloutKey,
    pub reason: EventReason,
    pub message: String,
}

/// An in-memory orchestrator. `children`/`riders` start empty; seed them via
/// [`FakeOrchestrator::seed_child`] to exercise a reconcile against existing state.
#[derive(Default)]
pub struct FakeOrchestrator {
    children: DashMap<ChildKey, ChildState>,
    riders: DashMap<RiderKey, RiderState>,
    analysis_runs: DashMap<AnalysisRunRef, AnalysisStatus>,
    events: Mutex<Vec<RecordedEvent>>,
    next_id: AtomicU64,
}

impl FakeOrchestrator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_child(&self, state: ChildState) {
        self.children.insert(state.key.clone(), state);
    }

    pub fn seed_rider(&self, state: RiderState) {
        self.riders.insert(state.key.clone(), state);
    }

    pub fn set_analysis_status(&self, run: &AnalysisRunRef, status: AnalysisStatus) {
        self.analysis_runs.insert(run.clone(), status);
    }

    #[must_use]
    pub fn recorded_events(&self) -> Vec<RecordedEvent> {
        self.events.lock().expect("event log mutex poisoned").clone()
    }

    fn next_resource_version(&self) -> String {
        (self.next_id.fetch_add(1, Ordering::Relaxed) + 1).to_string()
    }
}

#[async_trait]
impl OrchestratorClient for FakeOrchestrator {
    async fn get_child(&self, key: &ChildKey) -> Result<Option<ChildState>, OrchestratorError> {
        Ok(self.children.get(key).map(|r| r.clone()))
    }

    async fn create_child(&self, key: &ChildKey, spec: Value, labels: Labels) -> Result<(), OrchestratorError> {
        if self.children.contains_key(key) {
            return Err(OrchestratorError::Conflict {
                kind: key.kind.to_string(),
                name: key.namespaced_name.name.clone(),
            });
        }
        let lifecycle_state = labels
            .get(rollout_types::LABEL_UPGRADE_STATE)
            .and_then(|v| match v.as_str() {
                "Promoted" => Some(LifecycleState::Promoted),
                "Upgrading" => Some(LifecycleState::Upgrading),
                "Recyclable" => Some(LifecycleState::Recyclable),
                _ => None,
            })
            .unwrap_or(LifecycleState::Promoted);
        self.children.insert(
            key.clone(),
            ChildState {
                key: key.clone(),
                spec,
                annotations: std::collections::BTreeMap::new(),
                labels,
                status: ChildStatus::Pending,
                generation: 1,
                observed_generation: 0,
                resource_version: self.next_resource_version(),
                lifecycle_state,
                owner: None,
            },
        );
        Ok(())
    }

    async fn patch_child(&self, key: &ChildKey, spec: Value, resource_version: &str) -> Result<(), OrchestratorError> {
        let mut entry = self.children.get_mut(key).ok_or_else(|| OrchestratorError::NotFound {
            kind: key.kind.to_string(),
            namespace: key.namespaced_name.namespace.clone(),
            name: key.namespaced_name.name.clone(),
        })?;
        if entry.resource_version != resource_version {
            return Err(OrchestratorError::Conflict {
                kind: key.kind.to_string(),
                name: key.namespaced_name.name.clone(),
            });
        }
        entry.spec = spec;
        entry.generation += 1;
        entry.resource_version = self.next_resource_version();
        Ok(())
    }

    async fn delete_child(&self, key: &ChildKey) -> Result<(), OrchestratorError> {
        self.children.remove(key);
        Ok(())
    }

    async fn relabel_child(&self, key: &ChildKey, lifecycle_state: LifecycleState) -> Result<(), OrchestratorError> {
        let mut entry = self.children.get_mut(key).ok_or_else(|| OrchestratorError::NotFound {
            kind: key.kind.to_string(),
            namespace: key.namespaced_name.namespace.clone(),
            name: key.namespaced_name.name.clone(),
        })?;
        entry.lifecycle_state = lifecycle_state;
        let label = match lifecycle_state {
            LifecycleState::Promoted => "Promoted",
            LifecycleState::Upgrading => "Upgrading",
            LifecycleState::Recyclable => "Recyclable",
        };
        entry.labels.insert(rollout_types::LABEL_UPGRADE_STATE.to_string(), label.to_string());
        Ok(())
    }

    async fn get_rider(&self, key: &RiderKey) -> Result<Option<RiderState>, OrchestratorError> {
        Ok(self.riders.get(key).map(|r| r.clone()))
    }

    async fn apply_rider(&self, key: &RiderKey, def: Value) -> Result<(), OrchestratorError> {
        let stored_hash = def
            .pointer("/metadata/annotations")
            .and_then(|a| a.get(ANNOTATION_RIDER_HASH))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let resource_version = self.next_resource_version();
        self.riders.insert(
            key.clone(),
            RiderState {
                key: key.clone(),
                definition: def,
                stored_hash,
                resource_version,
            },
        );
        Ok(())
    }

    async fn delete_rider(&self, key: &RiderKey) -> Result<(), OrchestratorError> {
        self.riders.remove(key);
        Ok(())
    }

    async fn create_analysis_run(&self, owner: &ChildKey, _args: AnalysisArgs) -> Result<AnalysisRunRef, OrchestratorError> {
        let run = AnalysisRunRef {
            namespace: owner.namespaced_name.namespace.clone(),
            name: format!("{}-analysis-{}", owner.namespaced_name.name, self.next_resource_version()),
        };
        self.analysis_runs.insert(run.clone(), AnalysisStatus::Pending);
        Ok(run)
    }

    async fn get_analysis_status(&self, run: &AnalysisRunRef) -> Result<AnalysisStatus, OrchestratorError> {
        self.analysis_runs
            .get(run)
            .map(|r| *r)
            .ok_or_else(|| OrchestratorError::NotFound {
                kind: "AnalysisRun".to_string(),
                namespace: run.namespace.clone(),
                name: run.name.clone(),
            })
    }

    async fn emit_event(&self, target: &RolloutKey, reason: EventReason, message: &str) -> Result<(), OrchestratorError> {
        self.events.lock().expect("event log mutex poisoned").push(RecordedEvent {
            target: target.clone(),
            reason,
            message: message.to_string(),
        });
        Ok(())
    }
}
