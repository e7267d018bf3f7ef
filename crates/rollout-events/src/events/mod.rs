use serde::{Deserialize, Serialize};

pub mod general;
pub mod progressive;
pub mod reconcile;
pub mod rider;

pub use general::GeneralEvent;
pub use progressive::ProgressiveEvent;
pub use reconcile::{EventReason, ReconcileEvent};
pub use rider::RiderEvent;

/// Top-level event enum aggregating every domain's events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    General(GeneralEvent),
    Reconcile(ReconcileEvent),
    Progressive(ProgressiveEvent),
    Rider(RiderEvent),
}
