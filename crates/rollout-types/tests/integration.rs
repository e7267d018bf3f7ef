//! Integration tests for rollout-types

use rollout_types::{
    child::{ChildKey, LifecycleState},
    rollout::{NamespacedName, Phase, Rollout, RolloutKey, RolloutKind, RolloutStatus},
    strategy::Strategy,
};
use std::collections::BTreeMap;

fn rollout(generation: i64, status: RolloutStatus, annotations: BTreeMap<String, String>) -> Rollout {
    Rollout {
        key: RolloutKey::new("team-a", "orders", RolloutKind::PipelineRollout),
        generation,
        spec: serde_json::json!({}),
        annotations,
        labels: BTreeMap::new(),
        status,
    }
}

#[test]
fn child_name_uses_rollout_name_and_instance_id() {
    let key = ChildKey::for_instance("orders", 2, "team-a", RolloutKind::PipelineRollout);
    assert_eq!(key.namespaced_name.name, "orders-2");
    assert_eq!(key.namespaced_name.namespace, "team-a");
}

#[test]
fn generation_consistency_invariant() {
    let mut status = RolloutStatus::pending();
    status.observed_generation = 3;
    status.phase = Phase::Deployed;
    assert!(status.is_generation_consistent(3));
    assert!(!status.is_generation_consistent(4));

    status.phase = Phase::Pending;
    status.observed_generation = 2;
    assert!(status.is_generation_consistent(3));
}

#[test]
fn pending_invariant_rejects_deployed_ppnd() {
    let mut status = RolloutStatus::pending();
    status.upgrade_in_progress = Strategy::Ppnd;
    status.phase = Phase::Deployed;
    assert!(!status.respects_pending_invariant());

    status.phase = Phase::Pending;
    assert!(status.respects_pending_invariant());
}

#[test]
fn allow_data_loss_is_tolerant_of_free_form_values() {
    let mut annotations = BTreeMap::new();
    annotations.insert(
        rollout_types::ANNOTATION_ALLOW_DATA_LOSS.to_string(),
        "true".to_string(),
    );
    let r = rollout(1, RolloutStatus::pending(), annotations);
    assert!(r.allow_data_loss());

    let mut annotations = BTreeMap::new();
    annotations.insert(
        rollout_types::ANNOTATION_ALLOW_DATA_LOSS.to_string(),
        "false".to_string(),
    );
    let r = rollout(1, RolloutStatus::pending(), annotations);
    assert!(!r.allow_data_loss());

    let r = rollout(1, RolloutStatus::pending(), BTreeMap::new());
    assert!(!r.allow_data_loss());
}

#[test]
fn instance_id_defaults_to_zero() {
    let r = rollout(1, RolloutStatus::pending(), BTreeMap::new());
    assert_eq!(r.instance_id(), 0);

    let mut annotations = BTreeMap::new();
    annotations.insert(rollout_types::ANNOTATION_INSTANCE_ID.to_string(), "7".to_string());
    let r = rollout(1, RolloutStatus::pending(), annotations);
    assert_eq!(r.instance_id(), 7);
}

#[test]
fn namespaced_name_display() {
    let n = NamespacedName::new("team-a", "orders");
    assert_eq!(n.to_string(), "team-a/orders");
}

#[test]
fn lifecycle_state_roundtrips_through_json() {
    let s = LifecycleState::Upgrading;
    let json = serde_json::to_string(&s).unwrap();
    assert_eq!(json, r#""Upgrading""#);
    let back: LifecycleState = serde_json::from_str(&json).unwrap();
    assert_eq!(back, s);
}
