//! Per-rollout reconcile procedure — §4.E steps 1-6, generalized across the
//! four rollout kinds via [`crate::kind_profile::KindProfile`].

use crate::kind_profile::KindProfile;
use crate::{names, ppnd, progressive, riders};
use rollout_config::{Config, NamespaceOverride};
use rollout_errors::{Error, ReconcileError};
use rollout_events::{AppEvent, EventEmitter, EventReason, EventSender, ProgressiveEvent};
use rollout_orchestrator::OrchestratorClient;
use rollout_registry::Registry;
use rollout_types::strategy::PauseKey;
use rollout_types::{ChildRef, LifecycleState, Phase, Rollout, RolloutKind, Strategy, DEFAULT_ISB_SERVICE_NAME};
use rollout_usde::ClassifyInput;
use serde_json::Value;

/// Everything the per-reconcile procedure needs beyond the rollout itself.
pub struct ReconcileContext<'a> {
    pub profile: &'a dyn KindProfile,
    pub config: &'a Config,
    pub registry: &'a Registry,
    pub orchestrator: &'a dyn OrchestratorClient,
    pub events: &'a EventSender,
}

impl EventEmitter for ReconcileContext<'_> {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self.events)
    }
}

/// The dependency a pipeline or mono-vertex rollout's PPND sub-machine
/// pauses: its own interstep buffer service. ISB-service and controller
/// rollouts have no further dependency to pause, so they target themselves.
fn pause_key_for(ctx: &ReconcileContext<'_>, rollout: &Rollout, desired_spec: &Value) -> PauseKey {
    match ctx.profile.kind() {
        RolloutKind::PipelineRollout | RolloutKind::MonoVertexRollout => {
            let isb_name = desired_spec
                .get("interStepBufferServiceName")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_ISB_SERVICE_NAME);
            PauseKey::new(RolloutKind::IsbServiceRollout, rollout.key.namespace(), isb_name)
        }
        RolloutKind::IsbServiceRollout | RolloutKind::NumaflowControllerRollout => {
            PauseKey::new(ctx.profile.kind(), rollout.key.namespace(), rollout.key.name())
        }
    }
}

/// Runs one reconcile pass. `deleting` mirrors the watch layer's observation
/// that the rollout resource itself is being torn down.
pub async fn reconcile(rollout: &mut Rollout, deleting: bool, ctx: &ReconcileContext<'_>) -> Result<(), Error> {
    if deleting {
        for child in std::mem::take(&mut rollout.status.children) {
            ctx.orchestrator.delete_child(&child.key).await?;
        }
        return Ok(());
    }

    sweep_recyclable_children(rollout, ctx).await?;

    let desired_spec = rollout.spec.clone();

    // The store is the authority on which sub-machine currently owns this
    // rollout; a key it has never seen is reseeded from persisted status,
    // standing in for a reconciler picking a mid-flight upgrade back up
    // after a restart (§4.D).
    let active_strategy = match ctx.registry.strategy().get(&rollout.key) {
        Some(strategy) => strategy,
        None => {
            let seeded = rollout.status.upgrade_in_progress;
            ctx.registry.strategy().reseed(rollout.key.clone(), seeded);
            seeded
        }
    };

    if active_strategy == Strategy::Ppnd {
        resume_ppnd(rollout, &desired_spec, ctx).await?;
        return reconcile_riders(rollout, ctx).await;
    }
    if active_strategy == Strategy::Progressive {
        resume_progressive(rollout, &desired_spec, ctx).await?;
        return reconcile_riders(rollout, ctx).await;
    }

    let promoted = rollout
        .status
        .children
        .iter()
        .find(|c| c.state == LifecycleState::Promoted)
        .cloned();

    let Some(promoted) = promoted else {
        create_initial_child(rollout, &desired_spec, ctx).await?;
        return reconcile_riders(rollout, ctx).await;
    };

    let Some(existing) = ctx.orchestrator.get_child(&promoted.key).await? else {
        return Err(ReconcileError::ChildNotFound {
            rollout: rollout.key.to_string(),
            child: promoted.key.namespaced_name.name.clone(),
        }
        .into());
    };

    let excluded = ctx.profile.excluded_paths(ctx.config);
    let namespace_override = ctx
        .config
        .namespace_overrides
        .get(rollout.key.namespace())
        .and_then(NamespaceOverride::resolved_strategy);

    let classification = rollout_usde::classify(&ClassifyInput {
        old_spec: &existing.spec,
        new_spec: &desired_spec,
        old_annotations: &existing.annotations,
        new_annotations: &rollout.annotations,
        old_labels: &existing.labels,
        new_labels: &rollout.labels,
        excluded_paths: excluded,
        user_preference: namespace_override,
        default_strategy: ctx.config.default_strategy(),
    });

    if !classification.needs_update {
        if rollout.status.phase != Phase::Deployed && rollout.status.observed_generation == rollout.generation {
            rollout.status.phase = Phase::Deployed;
        }
        return reconcile_riders(rollout, ctx).await;
    }

    match classification.strategy {
        Strategy::NoOp => {}
        Strategy::Apply => {
            ctx.orchestrator
                .patch_child(&promoted.key, desired_spec.clone(), &existing.resource_version)
                .await?;
            rollout.status.phase = Phase::Deployed;
            rollout.status.observed_generation = rollout.generation;
            ctx.orchestrator
                .emit_event(&rollout.key, EventReason::Updating, "applied spec change in place")
                .await?;
        }
        Strategy::Ppnd => {
            rollout.status.upgrade_in_progress = Strategy::Ppnd;
            rollout.status.phase = Phase::Pending;
            rollout.status.ppnd_state = None;
            ctx.registry.strategy().set(rollout.key.clone(), Strategy::Ppnd);
            resume_ppnd(rollout, &desired_spec, ctx).await?;
        }
        Strategy::Progressive => {
            rollout.status.upgrade_in_progress = Strategy::Progressive;
            rollout.status.phase = Phase::Pending;
            rollout.status.progressive_state = None;
            ctx.registry.strategy().set(rollout.key.clone(), Strategy::Progressive);
            let upgrading_key = names::child_key(&rollout.key, rollout.instance_id());
            let labels = names::child_labels(&rollout.key, LifecycleState::Upgrading, &desired_spec);
            ctx.orchestrator.create_child(&upgrading_key, desired_spec.clone(), labels).await?;
            rollout.status.children.push(ChildRef { key: upgrading_key, state: LifecycleState::Upgrading });
            ctx.orchestrator
                .emit_event(&rollout.key, EventReason::Updating, "created upgrading candidate")
                .await?;
            resume_progressive(rollout, &desired_spec, ctx).await?;
        }
    }

    reconcile_riders(rollout, ctx).await
}

/// §4.F G3 completion: deletes `Recyclable` children once `recycle_deadline`
/// has elapsed. Runs at the top of every reconcile so a demoted child is
/// cleaned up on the first pass after its grace period ends, regardless of
/// which strategy (if any) is currently active.
async fn sweep_recyclable_children(rollout: &mut Rollout, ctx: &ReconcileContext<'_>) -> Result<(), Error> {
    if !progressive::recycle_deadline_elapsed(rollout.status.recycle_deadline, chrono::Utc::now()) {
        return Ok(());
    }

    let recyclable: Vec<_> = rollout
        .status
        .children
        .iter()
        .filter(|c| c.state == LifecycleState::Recyclable)
        .map(|c| c.key.clone())
        .collect();

    for key in &recyclable {
        ctx.orchestrator.delete_child(key).await?;
        ctx.emit(AppEvent::Progressive(ProgressiveEvent::RecyclableDeleted {
            rollout: rollout.key.clone(),
            child: key.clone(),
        }));
    }

    rollout.status.children.retain(|c| c.state != LifecycleState::Recyclable);
    rollout.status.recycle_deadline = None;
    Ok(())
}

async fn create_initial_child(rollout: &mut Rollout, desired_spec: &Value, ctx: &ReconcileContext<'_>) -> Result<(), Error> {
    let key = names::child_key(&rollout.key, rollout.instance_id());

    if let Some(existing) = ctx.orchestrator.get_child(&key).await? {
        if !existing.is_owned_by(&rollout.key) {
            rollout.status.phase = Phase::Failed;
            let reason = format!("child {} exists and is not owned by this rollout", key.namespaced_name.name);
            ctx.orchestrator.emit_event(&rollout.key, EventReason::Failed, &reason).await?;
            rollout.status.reason = Some(reason);
            return Ok(());
        }
    }

    let labels = names::child_labels(&rollout.key, LifecycleState::Promoted, desired_spec);
    ctx.orchestrator.create_child(&key, desired_spec.clone(), labels).await?;
    rollout.status.children.push(ChildRef { key, state: LifecycleState::Promoted });
    rollout.status.phase = Phase::Deployed;
    rollout.status.observed_generation = rollout.generation;
    ctx.orchestrator.emit_event(&rollout.key, EventReason::Deployed, "child created").await?;
    Ok(())
}

async fn resume_ppnd(rollout: &mut Rollout, desired_spec: &Value, ctx: &ReconcileContext<'_>) -> Result<(), Error> {
    let Some(promoted) = rollout.status.children.iter().find(|c| c.state == LifecycleState::Promoted).cloned() else {
        return Err(ReconcileError::ChildNotFound {
            rollout: rollout.key.to_string(),
            child: "<promoted>".to_string(),
        }
        .into());
    };

    let pause_key = pause_key_for(ctx, rollout, desired_spec);
    let allow_data_loss = rollout.allow_data_loss();
    let outcome = ppnd::advance(
        &mut rollout.status.ppnd_state,
        &promoted.key,
        desired_spec,
        ctx.profile.desired_phase_field(),
        pause_key,
        allow_data_loss,
        ctx.registry.pause(),
        ctx.orchestrator,
    )
    .await?;

    if outcome == ppnd::PpndOutcome::Done {
        rollout.status.upgrade_in_progress = Strategy::NoOp;
        rollout.status.phase = Phase::Deployed;
        rollout.status.observed_generation = rollout.generation;
        ctx.registry.strategy().clear(&rollout.key);
        ctx.orchestrator.emit_event(&rollout.key, EventReason::Deployed, "pause-and-drain upgrade complete").await?;
    }
    Ok(())
}

async fn resume_progressive(rollout: &mut Rollout, desired_spec: &Value, ctx: &ReconcileContext<'_>) -> Result<(), Error> {
    let Some(promoted) = rollout.status.children.iter().find(|c| c.state == LifecycleState::Promoted).cloned() else {
        return Err(ReconcileError::ChildNotFound {
            rollout: rollout.key.to_string(),
            child: "<promoted>".to_string(),
        }
        .into());
    };
    let Some(upgrading) = rollout.status.children.iter().find(|c| c.state == LifecycleState::Upgrading).cloned() else {
        return Err(rollout_errors::ProgressiveError::MissingUpgradingChild.into());
    };

    let profile_healthy = |status| ctx.profile.healthy(status);
    let args = None; // analysis is not declared on the distilled rollout spec surface; see DESIGN.md.

    let outcome = progressive::advance(
        &mut rollout.status.progressive_state,
        &mut rollout.status.analysis_run_name,
        &mut rollout.status.analysis_inconclusive_since,
        &promoted.key,
        &upgrading.key,
        profile_healthy,
        args,
        ctx.config.progressive.inconclusive_grace_seconds,
        chrono::Utc::now(),
        ctx.orchestrator,
    )
    .await?;

    match outcome {
        progressive::ProgressiveOutcome::InProgress => {}
        progressive::ProgressiveOutcome::Promoted => {
            for child in &mut rollout.status.children {
                if child.key == promoted.key {
                    child.state = LifecycleState::Recyclable;
                } else if child.key == upgrading.key {
                    child.state = LifecycleState::Promoted;
                }
            }
            rollout.status.recycle_deadline = Some(chrono::Utc::now() + chrono::Duration::seconds(ctx.config.progressive.recycle_grace_seconds as i64));

            // §4.F G3: shared riders stay attached, re-owned by the newly
            // promoted child; duplicated progressive-only riders are simply
            // dropped since the old generation they belonged to is gone.
            let declared = riders::declared_riders(desired_spec);
            let (_progressive_only, shared) = riders::split_for_progressive(&declared);
            riders::reown_on_promote(&shared, &upgrading.key, ctx.orchestrator).await?;

            rollout.status.upgrade_in_progress = Strategy::NoOp;
            rollout.status.phase = Phase::Deployed;
            rollout.status.observed_generation = rollout.generation;
            ctx.registry.strategy().clear(&rollout.key);
            ctx.orchestrator.emit_event(&rollout.key, EventReason::Promoting, "upgrading candidate promoted").await?;
        }
        progressive::ProgressiveOutcome::RolledBack => {
            rollout.status.children.retain(|c| c.key != upgrading.key);
            rollout.status.upgrade_in_progress = Strategy::NoOp;
            rollout.status.phase = Phase::Deployed;
            rollout.status.observed_generation = rollout.generation;
            ctx.registry.strategy().clear(&rollout.key);
            ctx.orchestrator.emit_event(&rollout.key, EventReason::RollingBack, "upgrading candidate rolled back").await?;
        }
    }
    Ok(())
}

/// §4.F/§4.G: riders declared on the rollout's own spec are split by
/// `requires_progressive` — shared riders stay attached to the Promoted
/// child, progressive-only riders are duplicated onto the Upgrading child
/// whenever one exists.
async fn reconcile_riders(rollout: &mut Rollout, ctx: &ReconcileContext<'_>) -> Result<(), Error> {
    let Some(promoted_key) = rollout
        .status
        .children
        .iter()
        .find(|c| c.state == LifecycleState::Promoted)
        .map(|c| c.key.clone())
    else {
        return Ok(());
    };

    let declared = riders::declared_riders(&rollout.spec);
    let (progressive_only, shared) = riders::split_for_progressive(&declared);
    let shared: Vec<rollout_types::Rider> = shared.into_iter().cloned().collect();
    riders::reconcile(&rollout.key, &promoted_key, &shared, ctx.config, ctx.orchestrator).await?;

    if let Some(upgrading_key) = rollout
        .status
        .children
        .iter()
        .find(|c| c.state == LifecycleState::Upgrading)
        .map(|c| c.key.clone())
    {
        let progressive_only: Vec<rollout_types::Rider> = progressive_only.into_iter().cloned().collect();
        riders::reconcile(&rollout.key, &upgrading_key, &progressive_only, ctx.config, ctx.orchestrator).await?;
    }

    Ok(())
}
