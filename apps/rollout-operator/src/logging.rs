//! Structured logging, mirroring the teacher CLI's split between tracing
//! setup and the event-to-log-record translation.

use rollout_events::{AppEvent, GeneralEvent, ProgressiveEvent, ReconcileEvent, RiderEvent};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

pub fn init_tracing(debug: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if debug { "debug" } else { "info" })
    });

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Logs one `AppEvent` at the level appropriate to its variant.
pub fn log_event(event: &AppEvent) {
    match event {
        AppEvent::Reconcile(event) => log_reconcile_event(event),
        AppEvent::Progressive(event) => log_progressive_event(event),
        AppEvent::Rider(event) => log_rider_event(event),
        AppEvent::General(event) => log_general_event(event),
    }
}

fn log_reconcile_event(event: &ReconcileEvent) {
    match event {
        ReconcileEvent::Started { rollout } => {
            info!(target: "rollout_operator", rollout = %rollout, "reconcile started");
        }
        ReconcileEvent::Reason { rollout, reason, message } => {
            info!(target: "rollout_operator", rollout = %rollout, reason = ?reason, "{message}");
        }
        ReconcileEvent::Completed { rollout } => {
            info!(target: "rollout_operator", rollout = %rollout, "reconcile completed");
        }
        ReconcileEvent::Requeued { rollout, reason } => {
            warn!(target: "rollout_operator", rollout = %rollout, reason = %reason, "reconcile requeued");
        }
        ReconcileEvent::PanicRecovered { rollout, message } => {
            error!(target: "rollout_operator", rollout = %rollout, message = %message, "reconcile panicked");
        }
    }
}

fn log_progressive_event(event: &ProgressiveEvent) {
    match event {
        ProgressiveEvent::UpgradingChildCreated { rollout, child } => {
            info!(target: "rollout_operator", rollout = %rollout, child = ?child, "upgrading candidate created");
        }
        ProgressiveEvent::AnalysisRunCreated { rollout, child, name } => {
            info!(target: "rollout_operator", rollout = %rollout, child = ?child, name = %name, "analysis run created");
        }
        ProgressiveEvent::AnalysisSucceeded { rollout, name } => {
            info!(target: "rollout_operator", rollout = %rollout, name = %name, "analysis succeeded");
        }
        ProgressiveEvent::AnalysisFailed { rollout, name, status } => {
            warn!(target: "rollout_operator", rollout = %rollout, name = %name, status = %status, "analysis failed");
        }
        ProgressiveEvent::Promoted { rollout, child } => {
            info!(target: "rollout_operator", rollout = %rollout, child = ?child, "upgrading candidate promoted");
        }
        ProgressiveEvent::RolledBack { rollout, child } => {
            warn!(target: "rollout_operator", rollout = %rollout, child = ?child, "upgrading candidate rolled back");
        }
        ProgressiveEvent::RecyclableDeleted { rollout, child } => {
            info!(target: "rollout_operator", rollout = %rollout, child = ?child, "recyclable child deleted");
        }
    }
}

fn log_rider_event(event: &RiderEvent) {
    match event {
        RiderEvent::Created { rollout, rider } => {
            info!(target: "rollout_operator", rollout = %rollout, rider = ?rider, "rider created");
        }
        RiderEvent::Updated { rollout, rider } => {
            info!(target: "rollout_operator", rollout = %rollout, rider = ?rider, "rider updated");
        }
        RiderEvent::Deleted { rollout, rider } => {
            info!(target: "rollout_operator", rollout = %rollout, rider = ?rider, "rider deleted");
        }
        RiderEvent::Forbidden { rollout, rider } => {
            warn!(target: "rollout_operator", rollout = %rollout, rider = ?rider, "rider declaration forbidden by permitted_riders");
        }
    }
}

fn log_general_event(event: &GeneralEvent) {
    match event {
        GeneralEvent::Debug { message } => {
            tracing::debug!(target: "rollout_operator", "{message}");
        }
        GeneralEvent::DebugWithContext { message, context } => {
            tracing::debug!(target: "rollout_operator", context = ?context, "{message}");
        }
        GeneralEvent::Warning { message } => {
            warn!(target: "rollout_operator", "{message}");
        }
        GeneralEvent::PolicyFallback { namespace, requested, fallback } => {
            warn!(
                target: "rollout_operator",
                namespace = %namespace,
                requested = %requested,
                fallback = %fallback,
                "requested upgrade strategy unrecognised, falling back"
            );
        }
    }
}
