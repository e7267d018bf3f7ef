//! Pause-propagate-new-spec-drain sub-machine — §4.E.
//!
//! Each call advances the machine by at most one state; the reconciler
//! drives it across many reconcile cycles. No timeouts: a pipeline stuck in
//! `Pausing` blocks forever unless the rollout carries the allow-data-loss
//! annotation, exactly as documented in the distilled spec's open question.

use rollout_errors::Error;
use rollout_orchestrator::OrchestratorClient;
use rollout_registry::PauseRegistry;
use rollout_types::strategy::PauseKey;
use rollout_types::{ChildKey, ChildStatus, PpndState};
use serde_json::Value;

/// Result of one `advance` call.
#[derive(Debug, PartialEq, Eq)]
pub enum PpndOutcome {
    /// Still in progress; `ppnd_state` has been updated in place.
    InProgress,
    /// Reached P4 with the child verified at the new generation. The caller
    /// clears `upgrade_in_progress` to `NoOp` and sets `phase = Deployed`.
    Done,
}

/// Sets a dotted path inside a JSON object to `value`, creating intermediate
/// objects as needed. A no-op on a non-object root.
fn set_nested(root: &mut Value, path: &str, value: Value) {
    let Value::Object(_) = root else { return };
    let mut cursor = root;
    let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
    let Some((last, prefix)) = segments.split_last() else { return };
    for segment in prefix {
        let map = cursor.as_object_mut().expect("cursor is always an object here");
        cursor = map
            .entry((*segment).to_string())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
    }
    if let Some(map) = cursor.as_object_mut() {
        map.insert((*last).to_string(), value);
    }
}

#[allow(clippy::too_many_arguments)]
pub async fn advance(
    ppnd_state: &mut Option<PpndState>,
    child_key: &ChildKey,
    desired_spec: &Value,
    desired_phase_field: &str,
    pause_key: PauseKey,
    allow_data_loss: bool,
    pause: &PauseRegistry,
    orchestrator: &dyn OrchestratorClient,
) -> Result<PpndOutcome, Error> {
    let state = ppnd_state.unwrap_or(PpndState::Idle);

    match state {
        PpndState::Idle => {
            pause.set(pause_key, rollout_types::strategy::TriState::True);
            *ppnd_state = Some(PpndState::AwaitingPause);
            Ok(PpndOutcome::InProgress)
        }

        PpndState::AwaitingPause => {
            let Some(child) = orchestrator.get_child(child_key).await? else {
                return Ok(PpndOutcome::InProgress);
            };
            let forced = child.status == ChildStatus::Pausing && allow_data_loss;
            if child.status == ChildStatus::Paused || forced {
                *ppnd_state = Some(PpndState::Apply);
            }
            Ok(PpndOutcome::InProgress)
        }

        PpndState::Apply => {
            let Some(child) = orchestrator.get_child(child_key).await? else {
                return Ok(PpndOutcome::InProgress);
            };
            let mut paused_spec = desired_spec.clone();
            if !desired_phase_field.is_empty() {
                set_nested(&mut paused_spec, desired_phase_field, Value::String("Paused".to_string()));
            }
            orchestrator
                .patch_child(child_key, paused_spec, &child.resource_version)
                .await?;
            *ppnd_state = Some(PpndState::Resume);
            Ok(PpndOutcome::InProgress)
        }

        PpndState::Resume => {
            let Some(child) = orchestrator.get_child(child_key).await? else {
                return Ok(PpndOutcome::InProgress);
            };
            orchestrator
                .patch_child(child_key, desired_spec.clone(), &child.resource_version)
                .await?;
            pause.set(pause_key, rollout_types::strategy::TriState::False);
            *ppnd_state = Some(PpndState::Verify);
            Ok(PpndOutcome::InProgress)
        }

        PpndState::Verify => {
            let Some(child) = orchestrator.get_child(child_key).await? else {
                return Ok(PpndOutcome::InProgress);
            };
            if child.status == ChildStatus::Running && child.observed_generation == child.generation {
                *ppnd_state = None;
                return Ok(PpndOutcome::Done);
            }
            Ok(PpndOutcome::InProgress)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollout_orchestrator::fake::FakeOrchestrator;
    use rollout_orchestrator::Labels;
    use rollout_registry::PauseRegistry;
    use rollout_types::{ChildState, RolloutKind};
    use serde_json::json;

    fn key() -> ChildKey {
        ChildKey::for_instance("r1", 0, "ns", RolloutKind::PipelineRollout)
    }

    fn pause_key() -> PauseKey {
        PauseKey::new(RolloutKind::IsbServiceRollout, "ns", "isbsvc-default")
    }

    async fn seeded(status: ChildStatus, generation: i64, observed_generation: i64) -> FakeOrchestrator {
        let fake = FakeOrchestrator::new();
        fake.create_child(&key(), json!({"replicas": 1}), Labels::new()).await.unwrap();
        fake.seed_child(ChildState {
            key: key(),
            spec: json!({"replicas": 1}),
            annotations: Default::default(),
            labels: Default::default(),
            status,
            generation,
            observed_generation,
            resource_version: "1".to_string(),
            lifecycle_state: rollout_types::LifecycleState::Promoted,
            owner: None,
        });
        fake
    }

    #[tokio::test]
    async fn full_cycle_through_five_calls() {
        let fake = seeded(ChildStatus::Pausing, 1, 0).await;
        let pause = PauseRegistry::new();
        let mut state = None;
        let desired = json!({"replicas": 2});

        // P0 -> P1
        let outcome = advance(&mut state, &key(), &desired, "lifecycle.desiredPhase", pause_key(), false, &pause, &fake).await.unwrap();
        assert_eq!(outcome, PpndOutcome::InProgress);
        assert_eq!(state, Some(PpndState::AwaitingPause));
        assert!(pause.is_paused(&pause_key()));

        // P1: stuck in Pausing, no allow-data-loss -> stays
        advance(&mut state, &key(), &desired, "lifecycle.desiredPhase", pause_key(), false, &pause, &fake).await.unwrap();
        assert_eq!(state, Some(PpndState::AwaitingPause));

        // Child reports Paused -> P2
        fake.seed_child(ChildState {
            key: key(), spec: json!({"replicas": 1}), annotations: Default::default(), labels: Default::default(),
            status: ChildStatus::Paused, generation: 1, observed_generation: 0, resource_version: "1".to_string(),
            lifecycle_state: rollout_types::LifecycleState::Promoted, owner: None,
        });
        advance(&mut state, &key(), &desired, "lifecycle.desiredPhase", pause_key(), false, &pause, &fake).await.unwrap();
        assert_eq!(state, Some(PpndState::Apply));

        // P2 -> P3, applies the paused spec
        advance(&mut state, &key(), &desired, "lifecycle.desiredPhase", pause_key(), false, &pause, &fake).await.unwrap();
        assert_eq!(state, Some(PpndState::Resume));
        let patched = fake.get_child(&key()).await.unwrap().unwrap();
        assert_eq!(patched.spec["lifecycle"]["desiredPhase"], json!("Paused"));

        // P3 -> P4, releases the pause and resumes
        advance(&mut state, &key(), &desired, "lifecycle.desiredPhase", pause_key(), false, &pause, &fake).await.unwrap();
        assert_eq!(state, Some(PpndState::Verify));
        assert!(!pause.is_paused(&pause_key()));
        let resumed = fake.get_child(&key()).await.unwrap().unwrap();
        assert_eq!(resumed.spec, json!({"replicas": 2}));

        // Not yet running at the new generation -> still in progress
        let outcome = advance(&mut state, &key(), &desired, "lifecycle.desiredPhase", pause_key(), false, &pause, &fake).await.unwrap();
        assert_eq!(outcome, PpndOutcome::InProgress);

        // Child reports Running at the new generation -> done
        fake.seed_child(ChildState {
            key: key(), spec: json!({"replicas": 2}), annotations: Default::default(), labels: Default::default(),
            status: ChildStatus::Running, generation: 2, observed_generation: 2, resource_version: "9".to_string(),
            lifecycle_state: rollout_types::LifecycleState::Promoted, owner: None,
        });
        let outcome = advance(&mut state, &key(), &desired, "lifecycle.desiredPhase", pause_key(), false, &pause, &fake).await.unwrap();
        assert_eq!(outcome, PpndOutcome::Done);
        assert_eq!(state, None);
    }

    #[tokio::test]
    async fn stuck_pausing_with_allow_data_loss_forces_past_p1() {
        let fake = seeded(ChildStatus::Pausing, 1, 0).await;
        let pause = PauseRegistry::new();
        let mut state = Some(PpndState::AwaitingPause);
        let desired = json!({"replicas": 2});

        let outcome = advance(&mut state, &key(), &desired, "lifecycle.desiredPhase", pause_key(), true, &pause, &fake).await.unwrap();
        assert_eq!(outcome, PpndOutcome::InProgress);
        assert_eq!(state, Some(PpndState::Apply));
    }

    #[test]
    fn set_nested_creates_intermediate_objects() {
        let mut root = json!({"replicas": 1});
        set_nested(&mut root, "lifecycle.desiredPhase", json!("Paused"));
        assert_eq!(root, json!({"replicas": 1, "lifecycle": {"desiredPhase": "Paused"}}));
    }
}
