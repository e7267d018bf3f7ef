//! End-to-end scenarios from the testable-properties list, driven through
//! the public reconcile entry point rather than the sub-machine modules
//! directly.

use rollout_config::{Config, ResourceFilterRule};
use rollout_orchestrator::fake::FakeOrchestrator;
use rollout_orchestrator::{Labels, OrchestratorClient};
use rollout_reconcile::kind_profile::PipelineProfile;
use rollout_reconcile::{reconcile, riders, ReconcileContext};
use rollout_registry::Registry;
use rollout_types::{
    ChildKey, ChildStatus, LifecycleState, Phase, PpndState, Rider, RiderKey, Rollout, RolloutKey,
    RolloutKind, RolloutStatus, Strategy, ANNOTATION_ALLOW_DATA_LOSS, ANNOTATION_INSTANCE_ID,
};
use serde_json::json;

fn new_rollout(spec: serde_json::Value) -> Rollout {
    Rollout {
        key: RolloutKey::new("ns", "r1", RolloutKind::PipelineRollout),
        generation: 1,
        spec,
        annotations: Default::default(),
        labels: Default::default(),
        status: RolloutStatus::pending(),
    }
}

/// Scenario 5: a child stuck in `Pausing` across repeated reconciles is
/// pushed past the P1 pause-wait once the rollout carries the
/// allow-data-loss annotation, and the sub-machine still reaches `Deployed`.
#[tokio::test]
async fn ppnd_force_drains_a_stuck_pausing_child() {
    let profile = PipelineProfile;
    let config = Config::default();
    let registry = Registry::new();
    let orchestrator = FakeOrchestrator::new();
    let (tx, _rx) = rollout_events::channel();
    let ctx = ReconcileContext { profile: &profile, config: &config, registry: &registry, orchestrator: &orchestrator, events: &tx };

    let mut rollout = new_rollout(json!({"vertices": [{"name": "a"}]}));
    reconcile(&mut rollout, false, &ctx).await.unwrap();

    rollout.generation = 2;
    rollout.spec = json!({"vertices": [{"name": "b"}]});
    rollout.annotations.insert(ANNOTATION_ALLOW_DATA_LOSS.to_string(), "true".to_string());
    reconcile(&mut rollout, false, &ctx).await.unwrap();
    assert_eq!(rollout.status.upgrade_in_progress, Strategy::Ppnd);
    assert_eq!(rollout.status.ppnd_state, Some(PpndState::AwaitingPause));

    let promoted_key = rollout.status.children[0].key.clone();
    let mut stuck = orchestrator.get_child(&promoted_key).await.unwrap().unwrap();
    stuck.status = ChildStatus::Pausing;
    orchestrator.seed_child(stuck);

    // Repeated reconciles against a child that never reports Paused: the
    // force check in P1 fires on the very next call since allow-data-loss is
    // already set, letting the machine proceed to completion regardless.
    for _ in 0..10 {
        reconcile(&mut rollout, false, &ctx).await.unwrap();
        if rollout.status.upgrade_in_progress == Strategy::NoOp {
            break;
        }
        if rollout.status.ppnd_state == Some(PpndState::Verify) {
            let mut child = orchestrator.get_child(&promoted_key).await.unwrap().unwrap();
            child.status = ChildStatus::Running;
            child.observed_generation = child.generation;
            orchestrator.seed_child(child);
        }
    }

    assert_eq!(rollout.status.phase, Phase::Deployed);
    assert_eq!(rollout.status.upgrade_in_progress, Strategy::NoOp);
}

/// Scenario 6: two reconciles of the same rider declaration perform exactly
/// one create and no subsequent update, because the second reconcile's
/// computed hash matches the stored one.
#[tokio::test]
async fn rider_reconcile_is_idempotent_on_an_unchanged_declaration() {
    let orchestrator = FakeOrchestrator::new();
    let mut config = Config::default();
    config.permitted_riders.push(ResourceFilterRule { kind: "ConfigMap".to_string(), group_version: "v1".to_string() });

    let owner_key = owner_child_key();
    orchestrator.create_child(&owner_key, json!({}), Labels::new()).await.unwrap();

    let declared = vec![Rider {
        key: RiderKey { name: "side-input".to_string(), kind: "ConfigMap".to_string(), group_version: "v1".to_string() },
        definition: json!({"data": {"k": "v"}}),
        requires_progressive: false,
    }];

    riders::reconcile(&rollout_key(), &owner_key, &declared, &config, &orchestrator).await.unwrap();
    let after_first = orchestrator.get_rider(&declared[0].key).await.unwrap().unwrap();

    riders::reconcile(&rollout_key(), &owner_key, &declared, &config, &orchestrator).await.unwrap();
    let after_second = orchestrator.get_rider(&declared[0].key).await.unwrap().unwrap();

    assert_eq!(after_first.resource_version, after_second.resource_version);
    assert_eq!(after_first.stored_hash, after_second.stored_hash);
}

fn rollout_key() -> RolloutKey {
    RolloutKey::new("ns", "r1", RolloutKind::PipelineRollout)
}

fn owner_child_key() -> ChildKey {
    ChildKey::for_instance("r1", 0, "ns", RolloutKind::PipelineRollout)
}

/// The "at most one Promoted child" invariant holds across a full
/// progressive cycle driven through the top-level reconciler.
#[tokio::test]
async fn progressive_rollout_keeps_exactly_one_promoted_child_after_promotion() {
    let profile = PipelineProfile;
    let config = Config::default();
    let registry = Registry::new();
    let orchestrator = FakeOrchestrator::new();
    let (tx, _rx) = rollout_events::channel();
    let ctx = ReconcileContext { profile: &profile, config: &config, registry: &registry, orchestrator: &orchestrator, events: &tx };

    let mut rollout = new_rollout(json!({"vertices": []}));
    reconcile(&mut rollout, false, &ctx).await.unwrap();

    rollout.generation = 2;
    rollout.spec = json!({"vertices": [{"name": "v2"}]});
    rollout.annotations.insert(ANNOTATION_INSTANCE_ID.to_string(), "1".to_string());
    reconcile(&mut rollout, false, &ctx).await.unwrap();
    assert_eq!(rollout.status.upgrade_in_progress, Strategy::Progressive);

    let upgrading_key = rollout.status.children.iter().find(|c| c.state == LifecycleState::Upgrading).unwrap().key.clone();
    let mut child = orchestrator.get_child(&upgrading_key).await.unwrap().unwrap();
    child.status = ChildStatus::Healthy;
    orchestrator.seed_child(child);
    reconcile(&mut rollout, false, &ctx).await.unwrap();

    let promoted_count = rollout.status.children.iter().filter(|c| c.state == LifecycleState::Promoted).count();
    assert_eq!(promoted_count, 1);
    let upgrading_count = rollout.status.children.iter().filter(|c| c.state == LifecycleState::Upgrading).count();
    assert_eq!(upgrading_count, 0);
}
