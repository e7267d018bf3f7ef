#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Strategy classifier (USDE) — §4.B.
//!
//! Given an old/new child spec and metadata plus kind-specific excluded
//! paths, a per-namespace user preference and a global default, decides
//! whether the child needs updating at all and, if so, which upgrade
//! strategy applies.

use rollout_diff::metadata_needs_update;
use rollout_types::strategy::{most_conservative, Strategy};
use serde_json::Value;
use std::collections::BTreeMap;

const ANNOTATION_INSTANCE_ID: &str = rollout_types::ANNOTATION_INSTANCE_ID;

/// Everything the classifier needs to reach a decision for one child.
pub struct ClassifyInput<'a> {
    pub old_spec: &'a Value,
    pub new_spec: &'a Value,
    pub old_annotations: &'a BTreeMap<String, String>,
    pub new_annotations: &'a BTreeMap<String, String>,
    pub old_labels: &'a BTreeMap<String, String>,
    pub new_labels: &'a BTreeMap<String, String>,
    /// Kind-specific excluded-paths configuration (e.g.
    /// `pipelineSpecExcludedPaths`).
    pub excluded_paths: &'a [String],
    /// Per-namespace override, when recognized (§6 "Per-namespace override").
    pub user_preference: Option<Strategy>,
    pub default_strategy: Strategy,
}

/// `(needsUpdate, strategy)` — the classifier's output pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub needs_update: bool,
    pub strategy: Strategy,
}

/// Runs the §4.B decision procedure against `input`.
#[must_use]
pub fn classify(input: &ClassifyInput<'_>) -> Classification {
    let spec_diff = rollout_diff::needs_update(input.old_spec, input.new_spec, input.excluded_paths);
    let spec_diff_strict = rollout_diff::needs_update(input.old_spec, input.new_spec, &[]);
    let meta_diff = metadata_needs_update(
        input.old_annotations,
        input.new_annotations,
        input.old_labels,
        input.new_labels,
    );
    let instance_id_changed =
        input.old_annotations.get(ANNOTATION_INSTANCE_ID) != input.new_annotations.get(ANNOTATION_INSTANCE_ID);

    // Step 3: neither a raw spec diff nor a metadata diff means no action at
    // all, even if the (controller-managed) instance-id annotation alone
    // changed — the instance-id signal only ever escalates an already-needed
    // update to Progressive, it does not independently trigger one. See
    // DESIGN.md for why this is preserved rather than special-cased.
    if !spec_diff_strict && !meta_diff {
        return Classification {
            needs_update: false,
            strategy: Strategy::NoOp,
        };
    }

    let mut candidates = Vec::with_capacity(3);
    if spec_diff {
        candidates.push(input.user_preference.unwrap_or(input.default_strategy));
    } else if spec_diff_strict {
        candidates.push(Strategy::Apply);
    }
    if meta_diff {
        candidates.push(Strategy::Apply);
    }
    if instance_id_changed {
        candidates.push(Strategy::Progressive);
    }

    Classification {
        needs_update: true,
        strategy: most_conservative(&candidates, input.user_preference),
    }
}
