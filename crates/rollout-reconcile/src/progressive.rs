//! Progressive rollout controller sub-machine — §4.F.
//!
//! During G1-G3 the rollout carries exactly two children: one `Promoted`, one
//! `Upgrading`. Analysis failure or a grace-period-expired `Inconclusive`
//! result routes to G4 (rollback), never to `phase = Failed`: rollback is
//! normal operation here, not an error.

use chrono::{DateTime, Utc};
use rollout_errors::Error;
use rollout_orchestrator::{AnalysisArgs, AnalysisStatus, OrchestratorClient};
use rollout_types::{ChildKey, LifecycleState, ProgressiveState};

/// Outcome of one `advance` call.
#[derive(Debug, PartialEq, Eq)]
pub enum ProgressiveOutcome {
    /// Still in progress; state fields have been updated in place.
    InProgress,
    /// G3 completed: exactly one `Promoted` child remains.
    Promoted,
    /// G4 completed: the upgrading candidate was discarded.
    RolledBack,
}

#[allow(clippy::too_many_arguments)]
pub async fn advance(
    progressive_state: &mut Option<ProgressiveState>,
    analysis_run_name: &mut Option<String>,
    analysis_inconclusive_since: &mut Option<DateTime<Utc>>,
    promoted_key: &ChildKey,
    upgrading_key: &ChildKey,
    healthy: impl Fn(rollout_types::ChildStatus) -> bool,
    analysis_args: Option<AnalysisArgs>,
    inconclusive_grace_seconds: u64,
    now: DateTime<Utc>,
    orchestrator: &dyn OrchestratorClient,
) -> Result<ProgressiveOutcome, Error> {
    let state = progressive_state.unwrap_or(ProgressiveState::Idle);

    match state {
        ProgressiveState::Idle => {
            // Entry is handled by the reconciler (child creation happens there,
            // since it owns spec derivation); reaching G0 with a call to
            // `advance` simply means "start analysing eligibility".
            *progressive_state = Some(ProgressiveState::CreatingUpgrading);
            Ok(ProgressiveOutcome::InProgress)
        }

        ProgressiveState::CreatingUpgrading => {
            let Some(child) = orchestrator.get_child(upgrading_key).await? else {
                return Ok(ProgressiveOutcome::InProgress);
            };
            if !healthy(child.status) {
                return Ok(ProgressiveOutcome::InProgress);
            }
            match analysis_args {
                Some(args) if analysis_run_name.is_none() => {
                    let run = orchestrator.create_analysis_run(upgrading_key, args).await?;
                    *analysis_run_name = Some(run.name);
                    *progressive_state = Some(ProgressiveState::Analysing);
                }
                Some(_) => {
                    *progressive_state = Some(ProgressiveState::Analysing);
                }
                None => {
                    *progressive_state = Some(ProgressiveState::Promoting);
                }
            }
            Ok(ProgressiveOutcome::InProgress)
        }

        ProgressiveState::Analysing => {
            let Some(run_name) = analysis_run_name.clone() else {
                *progressive_state = Some(ProgressiveState::Promoting);
                return Ok(ProgressiveOutcome::InProgress);
            };
            let run = rollout_orchestrator::AnalysisRunRef {
                namespace: upgrading_key.namespaced_name.namespace.clone(),
                name: run_name,
            };
            let status = orchestrator.get_analysis_status(&run).await?;

            match status {
                AnalysisStatus::Successful => {
                    *analysis_inconclusive_since = None;
                    *progressive_state = Some(ProgressiveState::Promoting);
                }
                AnalysisStatus::Failed => {
                    *analysis_inconclusive_since = None;
                    *progressive_state = Some(ProgressiveState::RollingBack);
                }
                AnalysisStatus::Inconclusive => {
                    let since = analysis_inconclusive_since.get_or_insert(now);
                    let elapsed = (now - *since).num_seconds().max(0) as u64;
                    if elapsed >= inconclusive_grace_seconds {
                        *progressive_state = Some(ProgressiveState::RollingBack);
                    }
                }
                AnalysisStatus::Pending | AnalysisStatus::Running | AnalysisStatus::Error => {}
            }
            Ok(ProgressiveOutcome::InProgress)
        }

        ProgressiveState::Promoting => {
            orchestrator.relabel_child(upgrading_key, LifecycleState::Promoted).await?;
            orchestrator.relabel_child(promoted_key, LifecycleState::Recyclable).await?;
            *progressive_state = None;
            *analysis_run_name = None;
            *analysis_inconclusive_since = None;
            Ok(ProgressiveOutcome::Promoted)
        }

        ProgressiveState::RollingBack => {
            orchestrator.relabel_child(upgrading_key, LifecycleState::Recyclable).await?;
            orchestrator.delete_child(upgrading_key).await?;
            *progressive_state = None;
            *analysis_run_name = None;
            *analysis_inconclusive_since = None;
            Ok(ProgressiveOutcome::RolledBack)
        }
    }
}

/// Whether a `Recyclable` child past `recycle_grace_seconds` since `deadline`
/// may be deleted (§4.F: "delete Recyclable children whose grace period has
/// elapsed").
#[must_use]
pub fn recycle_deadline_elapsed(deadline: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    deadline.is_some_and(|d| now >= d)
}
