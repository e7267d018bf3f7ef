//! Integration tests for rollout-errors

use rollout_errors::{Error, OrchestratorError, ReconcileError};

#[test]
fn conflict_converts_and_is_transient() {
    let orch = OrchestratorError::Conflict {
        kind: "Pipeline".into(),
        name: "orders-1".into(),
    };
    let err: Error = orch.into();
    assert!(err.is_transient());
    assert!(matches!(err, Error::Orchestrator(_)));
}

#[test]
fn malformed_spec_is_spec_derived_not_transient() {
    let err: Error = ReconcileError::MalformedSpec {
        reason: "missing vertices".into(),
    }
    .into();
    assert!(!err.is_transient());
}

#[test]
fn name_collision_is_spec_derived() {
    let e = ReconcileError::NameCollision {
        name: "orders-0".into(),
    };
    assert!(e.is_spec_derived());
}

#[test]
fn cancelled_is_transient() {
    assert!(Error::Cancelled.is_transient());
}
