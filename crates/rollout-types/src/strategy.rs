//! Upgrade strategy tag, pause tri-state, and their ordering.

use crate::rollout::{NamespacedName, RolloutKind};
use serde::{Deserialize, Serialize};

/// Upgrade strategy produced by the classifier (§4.B). Modeled as a flat tag,
/// dispatched on with a finite switch in the reconciler rather than as an
/// inheritance hierarchy (see design notes in `SPEC_FULL.md`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    NoOp,
    Apply,
    Ppnd,
    Progressive,
}

impl Strategy {
    /// Conservatism rank: `NoOp < Apply < {Ppnd, Progressive}`. Ppnd and
    /// Progressive are equally conservative; callers that need to break the
    /// tie do so explicitly rather than through `Ord`.
    #[must_use]
    pub fn conservatism_rank(self) -> u8 {
        match self {
            Self::NoOp => 0,
            Self::Apply => 1,
            Self::Ppnd | Self::Progressive => 2,
        }
    }

    /// Parses the `defaultUpgradeStrategy` / per-namespace override wire values.
    #[must_use]
    pub fn parse_config_value(value: &str) -> Option<Self> {
        match value {
            "apply" => Some(Self::Apply),
            "pause-and-drain" => Some(Self::Ppnd),
            "progressive" => Some(Self::Progressive),
            "no-strategy" | "" => None,
            _ => None,
        }
    }
}

/// Picks the most conservative strategy among a non-empty set of candidates.
/// When both `Ppnd` and `Progressive` are present, prefers `preference` if it
/// names one of them, otherwise prefers `Progressive` (§4.B rationale, and
/// design notes open question).
#[must_use]
pub fn most_conservative(candidates: &[Strategy], preference: Option<Strategy>) -> Strategy {
    let max_rank = candidates.iter().map(|s| s.conservatism_rank()).max().unwrap_or(0);
    let tied: Vec<Strategy> = candidates
        .iter()
        .copied()
        .filter(|s| s.conservatism_rank() == max_rank)
        .collect();

    if tied.len() <= 1 {
        return tied.first().copied().unwrap_or(Strategy::NoOp);
    }

    // Tied candidates at the top rank can only be {Ppnd, Progressive}.
    if let Some(pref) = preference {
        if tied.contains(&pref) {
            return pref;
        }
    }
    Strategy::Progressive
}

/// Tri-state opinion a contributor expresses about pausing a target.
/// `Unset` carries no opinion and is excluded from aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriState {
    True,
    False,
    Unset,
}

/// Key into the process-wide pause request registry: the dependency a
/// rollout's PPND sub-machine needs paused, identified by the dependency's
/// own kind/namespace/name (e.g. the interstep buffer service or controller
/// it depends on).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PauseKey {
    pub kind: RolloutKind,
    pub namespaced_name: NamespacedName,
}

impl PauseKey {
    #[must_use]
    pub fn new(kind: RolloutKind, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            namespaced_name: NamespacedName::new(namespace, name),
        }
    }
}
