//! Supporting types for the `OrchestratorClient` boundary — §6.

use std::collections::BTreeMap;

/// Labels to attach when creating a child or rider.
pub type Labels = BTreeMap<String, String>;

/// Template references and forwarded arguments for an analysis run, mirrored
/// from the progressive rollout's `Analysis` spec field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisArgs {
    pub template_names: Vec<String>,
    pub args: BTreeMap<String, String>,
}

/// Identity of a created analysis run, returned so the progressive
/// controller can poll it later without re-deriving its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnalysisRunRef {
    pub namespace: String,
    pub name: String,
}

/// Terminal and non-terminal phases an analysis run collaborator reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStatus {
    Pending,
    Running,
    Successful,
    Failed,
    Inconclusive,
    Error,
}

impl AnalysisStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending | Self::Running)
    }

    #[must_use]
    pub fn is_successful(self) -> bool {
        matches!(self, Self::Successful)
    }
}
