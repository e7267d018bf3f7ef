//! Child naming and the two controller labels every child carries (§6).

use rollout_types::{
    ChildKey, LifecycleState, RolloutKey, DEFAULT_ISB_SERVICE_NAME, LABEL_ISB_SERVICE_NAME,
    LABEL_ROLLOUT_NAME, LABEL_UPGRADE_STATE,
};
use serde_json::Value;
use std::collections::BTreeMap;

/// Derives the child's identity for `instance_id` per §3: `"{rollout}-{instance_id}"`.
#[must_use]
pub fn child_key(rollout: &RolloutKey, instance_id: u32) -> ChildKey {
    ChildKey::for_instance(rollout.name(), instance_id, rollout.namespace(), rollout.kind)
}

/// Builds the label set for a child: upgrade-state, rollout-name, and the
/// ISB-service-name label propagated from `interStepBufferServiceName`
/// (defaulting to `"default"` when the desired spec omits it).
#[must_use]
pub fn child_labels(rollout: &RolloutKey, lifecycle_state: LifecycleState, desired_spec: &Value) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    let state = match lifecycle_state {
        LifecycleState::Promoted => "Promoted",
        LifecycleState::Upgrading => "Upgrading",
        LifecycleState::Recyclable => "Recyclable",
    };
    labels.insert(LABEL_UPGRADE_STATE.to_string(), state.to_string());
    labels.insert(LABEL_ROLLOUT_NAME.to_string(), rollout.namespaced_name.name.clone());

    let isb_name = desired_spec
        .get("interStepBufferServiceName")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_ISB_SERVICE_NAME);
    labels.insert(LABEL_ISB_SERVICE_NAME.to_string(), isb_name.to_string());
    labels
}
