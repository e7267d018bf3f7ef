#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication inside the rollout control plane.
//!
//! All operator-visible output goes through events: reconcile loops never
//! print or log directly, they emit through `EventEmitter` and a
//! `tracing` layer (or the orchestrator's event API) turns that into
//! observable output. Mirrors the teacher's "no direct logging outside the
//! CLI" discipline.

pub mod events;
pub mod meta;

pub use events::{AppEvent, EventReason, GeneralEvent, ProgressiveEvent, ReconcileEvent, RiderEvent};
pub use meta::{EventLevel, EventMeta, EventSource};

use tokio::sync::mpsc::UnboundedSender;

/// Type alias for the event sender.
pub type EventSender = UnboundedSender<AppEvent>;

/// Type alias for the event receiver.
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<AppEvent>;

/// Creates a new event channel.
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events from any component that holds an
/// `EventSender`.
pub trait EventEmitter {
    fn event_sender(&self) -> Option<&EventSender>;

    fn emit(&self, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            let _ = sender.send(event);
        }
    }

    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::debug(message)));
    }

    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message)));
    }

    fn emit_policy_fallback(&self, namespace: impl Into<String>, requested: impl Into<String>, fallback: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::PolicyFallback {
            namespace: namespace.into(),
            requested: requested.into(),
            fallback: fallback.into(),
        }));
    }
}
