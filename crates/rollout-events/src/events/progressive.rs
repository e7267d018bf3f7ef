//! Progressive controller domain events.

use rollout_types::{child::ChildKey, rollout::RolloutKey};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ProgressiveEvent {
    UpgradingChildCreated { rollout: RolloutKey, child: ChildKey },
    AnalysisRunCreated { rollout: RolloutKey, child: ChildKey, name: String },
    AnalysisSucceeded { rollout: RolloutKey, name: String },
    AnalysisFailed { rollout: RolloutKey, name: String, status: String },
    Promoted { rollout: RolloutKey, child: ChildKey },
    RolledBack { rollout: RolloutKey, child: ChildKey },
    RecyclableDeleted { rollout: RolloutKey, child: ChildKey },
}
