//! Rider attachment — §4.G, grounded on the original's hash-then-own ordering
//! and its addition/modification/deletion split keyed by `(kind, name)`.

use rollout_config::Config;
use rollout_errors::{Error, RiderError};
use rollout_orchestrator::OrchestratorClient;
use rollout_types::{Rider, RiderKey, RiderState, RolloutKey, ANNOTATION_RIDER_HASH};
use serde_json::Value;
use tracing::warn;

/// Reads the rider declarations carried on a rollout's opaque spec, under the
/// conventional `"riders"` array field — the same "read a known key off the
/// per-kind `Value`" approach `reconciler::pause_key_for` uses for
/// `interStepBufferServiceName`. A malformed entry is skipped with a warning
/// rather than failing the whole reconcile, matching the fixture loader's
/// tolerant-skip discipline.
#[must_use]
pub fn declared_riders(spec: &Value) -> Vec<Rider> {
    let Some(entries) = spec.get("riders").and_then(Value::as_array) else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| match serde_json::from_value::<Rider>(entry.clone()) {
            Ok(rider) => Some(rider),
            Err(err) => {
                warn!(error = %err, "skipping malformed rider declaration");
                None
            }
        })
        .collect()
}

/// Classification of one declared rider against its observed state.
enum Plan {
    Create(Value),
    Update(Value),
    Unchanged,
}

/// Computes the content hash of a rider definition before any
/// owner-reference or annotation is injected, matching the original's
/// `WithHashAnnotation` ordering: the hash must be stable across reconciles
/// that don't change the rider's own content.
#[must_use]
pub fn content_hash(definition: &Value) -> String {
    let canonical = serde_json::to_vec(definition).unwrap_or_default();
    blake3::hash(&canonical).to_hex().to_string()
}

/// Stamps `definition` with its content-hash annotation and an owner
/// reference pointing at `owner`. Called only after [`content_hash`] has
/// already been computed from the un-stamped definition.
fn prepare_for_deployment(mut definition: Value, hash: &str, owner: &rollout_types::ChildKey) -> Value {
    let obj = definition.as_object_mut().expect("rider definition is a JSON object");
    let metadata = obj
        .entry("metadata")
        .or_insert_with(|| Value::Object(serde_json::Map::new()));
    let metadata_obj = metadata.as_object_mut().expect("metadata is a JSON object");

    let annotations = metadata_obj
        .entry("annotations")
        .or_insert_with(|| Value::Object(serde_json::Map::new()));
    annotations
        .as_object_mut()
        .expect("annotations is a JSON object")
        .insert(ANNOTATION_RIDER_HASH.to_string(), Value::String(hash.to_string()));

    metadata_obj.insert(
        "ownerReferences".to_string(),
        serde_json::json!([{
            "kind": owner.kind.to_string(),
            "name": owner.namespaced_name.name,
        }]),
    );
    definition
}

fn classify(declared: &Value, hash: &str, existing: Option<&RiderState>) -> Plan {
    match existing {
        None => Plan::Create(declared.clone()),
        Some(state) if state.stored_hash != hash => Plan::Update(declared.clone()),
        Some(_) => Plan::Unchanged,
    }
}

/// Reconciles the full set of riders declared on a rollout against what the
/// orchestrator currently holds for `owner`, keyed by `(kind, name)`:
/// declared-but-absent riders are created, declared-with-changed-hash riders
/// are updated, and previously-applied riders no longer declared are deleted.
/// A declared rider naming a non-permitted `(kind, group_version)` aborts the
/// whole batch with [`RiderError::Forbidden`] before anything is written.
pub async fn reconcile(
    _rollout: &RolloutKey,
    owner: &rollout_types::ChildKey,
    declared: &[rollout_types::Rider],
    config: &Config,
    orchestrator: &dyn OrchestratorClient,
) -> Result<(), Error> {
    for rider in declared {
        if !config.rider_is_permitted(&rider.key.kind, &rider.key.group_version) {
            return Err(RiderError::Forbidden {
                kind: rider.key.kind.clone(),
                name: rider.key.name.clone(),
            }
            .into());
        }
    }

    for rider in declared {
        let hash = content_hash(&rider.definition);
        let existing = orchestrator.get_rider(&rider.key).await?;
        match classify(&rider.definition, &hash, existing.as_ref()) {
            Plan::Create(def) | Plan::Update(def) => {
                let prepared = prepare_for_deployment(def, &hash, owner);
                orchestrator.apply_rider(&rider.key, prepared).await?;
            }
            Plan::Unchanged => {}
        }
    }

    Ok(())
}

/// Deletes riders that are no longer declared, given the rider keys declared
/// on the previous reconcile (`previously_declared`, carried in the rollout's
/// own status rather than re-derived here: the orchestrator trait exposes
/// per-key get/apply/delete only, with no "list riders owned by X" query to
/// diff against) and the current set.
pub async fn delete_removed(
    previously_declared: &[RiderKey],
    currently_declared: &[rollout_types::Rider],
    orchestrator: &dyn OrchestratorClient,
) -> Result<(), Error> {
    let current: std::collections::HashSet<&RiderKey> =
        currently_declared.iter().map(|r| &r.key).collect();
    for key in previously_declared {
        if !current.contains(key) {
            orchestrator.delete_rider(key).await?;
        }
    }
    Ok(())
}

/// Progressive G1 entry: riders flagged `requires_progressive` are
/// duplicated onto the Upgrading child rather than shared with the Promoted
/// one (§4.F "Rider handling during progressive").
#[must_use]
pub fn split_for_progressive(declared: &[rollout_types::Rider]) -> (Vec<&rollout_types::Rider>, Vec<&rollout_types::Rider>) {
    declared.iter().partition(|r| r.requires_progressive)
}

/// Progressive G3 completion: shared riders stay pointed at the new
/// Promoted child (re-owned), duplicated old-generation riders are dropped.
pub async fn reown_on_promote(
    shared: &[&rollout_types::Rider],
    new_owner: &rollout_types::ChildKey,
    orchestrator: &dyn OrchestratorClient,
) -> Result<(), Error> {
    for rider in shared {
        let hash = content_hash(&rider.definition);
        let prepared = prepare_for_deployment(rider.definition.clone(), &hash, new_owner);
        orchestrator.apply_rider(&rider.key, prepared).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollout_orchestrator::fake::FakeOrchestrator;
    use rollout_types::{ChildKey, Rider, RolloutKind};
    use serde_json::json;

    fn owner() -> ChildKey {
        ChildKey::for_instance("r1", 0, "ns", RolloutKind::PipelineRollout)
    }

    fn rollout_key() -> RolloutKey {
        RolloutKey::new("ns", "r1", RolloutKind::PipelineRollout)
    }

    fn rider(name: &str) -> Rider {
        Rider {
            key: RiderKey { name: name.to_string(), kind: "ConfigMap".to_string(), group_version: "v1".to_string() },
            definition: json!({"data": {"k": "v"}}),
            requires_progressive: false,
        }
    }

    fn permissive_config() -> Config {
        let mut config = Config::default();
        config.permitted_riders.push(rollout_config::ResourceFilterRule {
            kind: "ConfigMap".to_string(),
            group_version: "v1".to_string(),
        });
        config
    }

    #[tokio::test]
    async fn forbidden_rider_aborts_before_any_write() {
        let fake = FakeOrchestrator::new();
        let config = Config::default();
        let declared = vec![rider("side-input")];
        let err = reconcile(&rollout_key(), &owner(), &declared, &config, &fake).await.unwrap_err();
        assert!(matches!(err, Error::Rider(RiderError::Forbidden { .. })));
        assert!(fake.get_rider(&declared[0].key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn first_reconcile_creates_exactly_once() {
        let fake = FakeOrchestrator::new();
        let config = permissive_config();
        let declared = vec![rider("side-input")];
        reconcile(&rollout_key(), &owner(), &declared, &config, &fake).await.unwrap();
        let observed = fake.get_rider(&declared[0].key).await.unwrap().unwrap();
        assert_eq!(observed.definition["metadata"]["annotations"][ANNOTATION_RIDER_HASH], observed.stored_hash);
    }

    #[tokio::test]
    async fn second_reconcile_with_identical_content_is_a_no_op() {
        let fake = FakeOrchestrator::new();
        let config = permissive_config();
        let declared = vec![rider("side-input")];
        reconcile(&rollout_key(), &owner(), &declared, &config, &fake).await.unwrap();
        let first_version = fake.get_rider(&declared[0].key).await.unwrap().unwrap().resource_version;

        reconcile(&rollout_key(), &owner(), &declared, &config, &fake).await.unwrap();
        let second_version = fake.get_rider(&declared[0].key).await.unwrap().unwrap().resource_version;
        assert_eq!(first_version, second_version);
    }

    #[tokio::test]
    async fn changed_content_triggers_an_update() {
        let fake = FakeOrchestrator::new();
        let config = permissive_config();
        let mut declared = vec![rider("side-input")];
        reconcile(&rollout_key(), &owner(), &declared, &config, &fake).await.unwrap();
        let first_hash = fake.get_rider(&declared[0].key).await.unwrap().unwrap().stored_hash;

        declared[0].definition = json!({"data": {"k": "new-value"}});
        reconcile(&rollout_key(), &owner(), &declared, &config, &fake).await.unwrap();
        let second_hash = fake.get_rider(&declared[0].key).await.unwrap().unwrap().stored_hash;
        assert_ne!(first_hash, second_hash);
    }

    #[tokio::test]
    async fn delete_removed_drops_riders_absent_from_the_current_declaration() {
        let fake = FakeOrchestrator::new();
        let config = permissive_config();
        let declared = vec![rider("side-input")];
        reconcile(&rollout_key(), &owner(), &declared, &config, &fake).await.unwrap();

        delete_removed(&[declared[0].key.clone()], &[], &fake).await.unwrap();
        assert!(fake.get_rider(&declared[0].key).await.unwrap().is_none());
    }

    #[test]
    fn declared_riders_reads_the_conventional_spec_field() {
        let spec = json!({
            "vertices": [],
            "riders": [
                {"key": {"name": "side-input", "kind": "ConfigMap", "group_version": "v1"}, "definition": {"data": {}}, "requires_progressive": false},
            ],
        });
        let declared = declared_riders(&spec);
        assert_eq!(declared.len(), 1);
        assert_eq!(declared[0].key.name, "side-input");
    }

    #[test]
    fn declared_riders_skips_a_malformed_entry_instead_of_failing() {
        let spec = json!({"riders": [{"not": "a rider"}]});
        assert!(declared_riders(&spec).is_empty());
    }

    #[test]
    fn declared_riders_is_empty_when_the_field_is_absent() {
        assert!(declared_riders(&json!({"vertices": []})).is_empty());
    }

    #[test]
    fn split_for_progressive_partitions_by_flag() {
        let mut shared = rider("shared");
        shared.requires_progressive = false;
        let mut dup = rider("dup");
        dup.requires_progressive = true;
        let declared = vec![shared, dup];
        let (progressive_only, common) = split_for_progressive(&declared);
        assert_eq!(progressive_only.len(), 1);
        assert_eq!(progressive_only[0].key.name, "dup");
        assert_eq!(common.len(), 1);
        assert_eq!(common[0].key.name, "shared");
    }

    #[test]
    fn content_hash_changes_with_content() {
        let a = content_hash(&json!({"data": {"k": "v"}}));
        let b = content_hash(&json!({"data": {"k": "v2"}}));
        assert_ne!(a, b);
    }
}
