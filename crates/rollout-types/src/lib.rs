#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the rollout control plane.
//!
//! This crate provides the data model shared by every component of the
//! Unified Sync / Difference Engine: rollout identity, child identity, the
//! upgrade strategy tag, lifecycle labels, pause requests and riders.

pub mod child;
pub mod machine;
pub mod rider;
pub mod rollout;
pub mod strategy;

pub use child::{ChildKey, ChildRef, ChildState, ChildStatus, LifecycleState};
pub use machine::{PpndState, ProgressiveState};
pub use rider::{Rider, RiderKey, RiderState};
pub use rollout::{NamespacedName, Phase, Rollout, RolloutKey, RolloutKind, RolloutStatus};
pub use strategy::{PauseKey, Strategy, TriState};

/// Annotation key whose value is an arbitrary truthy string forcing the PPND
/// sub-machine past a stuck `Pausing` observation.
pub const ANNOTATION_ALLOW_DATA_LOSS: &str = "numaflow.numaproj.io/allow-data-loss";

/// Annotation key holding the small monotone integer that names a rollout's
/// current generation of children. A change here always forces Progressive.
pub const ANNOTATION_INSTANCE_ID: &str = "numaflow.numaproj.io/instance-id";

/// Annotation key under which a rider's content hash is stored.
pub const ANNOTATION_RIDER_HASH: &str = "numaflow.numaproj.io/rider-hash";

/// Label key carrying a child's or rider's lifecycle state.
pub const LABEL_UPGRADE_STATE: &str = "numaflow.numaproj.io/upgrade-state";

/// Label key carrying the owning rollout's name.
pub const LABEL_ROLLOUT_NAME: &str = "numaflow.numaproj.io/rollout-name";

/// Label propagated onto a child from its spec's `interStepBufferServiceName`,
/// defaulting to `"default"` when the field is absent.
pub const LABEL_ISB_SERVICE_NAME: &str = "numaflow.numaproj.io/isbsvc-name";

/// Default interstep buffer service name used when a child spec omits one.
pub const DEFAULT_ISB_SERVICE_NAME: &str = "default";
