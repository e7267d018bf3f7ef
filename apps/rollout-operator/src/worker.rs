//! Bounded-concurrency reconcile pass over one batch of rollouts.
//!
//! Mirrors `crates/install`'s per-package single-flight discipline: a
//! `DashMap` keyed by rollout identity enforces at most one in-flight
//! reconcile per key, and a `tokio::sync::Semaphore` sized from
//! `general.max_concurrent_reconciles` bounds overall concurrency (SPEC_FULL.md
//! §5). Futures are driven with `futures::future::join_all` rather than
//! `tokio::spawn`, since `ReconcileContext` borrows `config`/`registry`/
//! `orchestrator` for the duration of the pass and spawning would require
//! `'static` ownership we have no need for here.

use dashmap::DashMap;
use futures::future::join_all;
use futures::FutureExt;
use rollout_config::Config;
use rollout_events::{AppEvent, EventEmitter, EventSender, ReconcileEvent};
use rollout_orchestrator::OrchestratorClient;
use rollout_reconcile::kind_profile::{
    IsbServiceProfile, KindProfile, MonoVertexProfile, NumaflowControllerProfile, PipelineProfile,
};
use rollout_reconcile::{reconcile, ReconcileContext};
use rollout_registry::Registry;
use rollout_types::{Rollout, RolloutKey, RolloutKind};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

struct WorkerEvents(EventSender);

impl EventEmitter for WorkerEvents {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.0)
    }
}

fn profile_for(kind: RolloutKind) -> Box<dyn KindProfile> {
    match kind {
        RolloutKind::PipelineRollout => Box::new(PipelineProfile),
        RolloutKind::IsbServiceRollout => Box::new(IsbServiceProfile),
        RolloutKind::MonoVertexRollout => Box::new(MonoVertexProfile),
        RolloutKind::NumaflowControllerRollout => Box::new(NumaflowControllerProfile),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "reconcile panicked with a non-string payload".to_string()
    }
}

/// Reconciles every rollout in `rollouts` at most once, skipping any key
/// already present from an earlier, still-running pass and dropping any item
/// whose permit would only be granted after `cancel` fires. Returns the
/// (possibly mutated) rollouts that actually ran, in no particular order.
pub async fn reconcile_batch(
    rollouts: Vec<Rollout>,
    config: &Config,
    registry: &Registry,
    orchestrator: &dyn OrchestratorClient,
    events: EventSender,
    cancel: &CancellationToken,
) -> Vec<Rollout> {
    let semaphore = Semaphore::new(config.general.max_concurrent_reconciles.max(1));
    let inflight: DashMap<RolloutKey, ()> = DashMap::new();
    let emitter = WorkerEvents(events);

    let accepted: Vec<Rollout> = rollouts
        .into_iter()
        .filter(|rollout| inflight.insert(rollout.key.clone(), ()).is_none())
        .collect();

    let futures = accepted.into_iter().map(|mut rollout| {
        let semaphore = &semaphore;
        let emitter = &emitter;
        async move {
            let _permit = semaphore.acquire().await.expect("semaphore is never closed");
            if cancel.is_cancelled() {
                return None;
            }

            emitter.emit(AppEvent::Reconcile(ReconcileEvent::Started { rollout: rollout.key.clone() }));
            let profile = profile_for(rollout.key.kind);
            let ctx = ReconcileContext { profile: profile.as_ref(), config, registry, orchestrator, events: &emitter.0 };

            let outcome = std::panic::AssertUnwindSafe(reconcile(&mut rollout, false, &ctx))
                .catch_unwind()
                .await;

            match outcome {
                Ok(Ok(())) => {
                    emitter.emit(AppEvent::Reconcile(ReconcileEvent::Completed { rollout: rollout.key.clone() }));
                }
                Ok(Err(err)) => {
                    emitter.emit(AppEvent::Reconcile(ReconcileEvent::Requeued {
                        rollout: rollout.key.clone(),
                        reason: err.to_string(),
                    }));
                }
                Err(panic) => {
                    emitter.emit(AppEvent::Reconcile(ReconcileEvent::PanicRecovered {
                        rollout: rollout.key.clone(),
                        message: panic_message(&panic),
                    }));
                }
            }
            Some(rollout)
        }
    });

    join_all(futures).await.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollout_orchestrator::fake::FakeOrchestrator;
    use rollout_orchestrator::OrchestratorClient;
    use rollout_types::RolloutStatus;
    use serde_json::json;

    fn rollout(name: &str) -> Rollout {
        Rollout {
            key: RolloutKey::new("ns", name, RolloutKind::PipelineRollout),
            generation: 1,
            spec: json!({"vertices": []}),
            annotations: Default::default(),
            labels: Default::default(),
            status: RolloutStatus::pending(),
        }
    }

    #[tokio::test]
    async fn reconciles_every_distinct_rollout_once() {
        let config = Config::default();
        let registry = Registry::new();
        let orchestrator = FakeOrchestrator::new();
        let (tx, _rx) = rollout_events::channel();
        let cancel = CancellationToken::new();

        let results = reconcile_batch(
            vec![rollout("a"), rollout("b")],
            &config,
            &registry,
            &orchestrator,
            tx,
            &cancel,
        )
        .await;

        assert_eq!(results.len(), 2);
        for r in &results {
            assert_eq!(r.status.phase, rollout_types::Phase::Deployed);
        }
    }

    #[tokio::test]
    async fn a_duplicate_key_in_the_same_batch_only_runs_once() {
        let config = Config::default();
        let registry = Registry::new();
        let orchestrator = FakeOrchestrator::new();
        let (tx, _rx) = rollout_events::channel();
        let cancel = CancellationToken::new();

        let results = reconcile_batch(
            vec![rollout("a"), rollout("a")],
            &config,
            &registry,
            &orchestrator,
            tx,
            &cancel,
        )
        .await;

        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn a_cancelled_token_drops_items_before_they_write_status() {
        let config = Config::default();
        let registry = Registry::new();
        let orchestrator = FakeOrchestrator::new();
        let (tx, _rx) = rollout_events::channel();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let results = reconcile_batch(
            vec![rollout("a")],
            &config,
            &registry,
            &orchestrator,
            tx,
            &cancel,
        )
        .await;

        assert!(results.is_empty());
        assert!(orchestrator.get_child(&rollout_types::ChildKey::for_instance("a", 0, "ns", RolloutKind::PipelineRollout)).await.unwrap().is_none());
    }
}
