//! Rider attachment domain events.

use rollout_types::rider::RiderKey;
use rollout_types::rollout::RolloutKey;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RiderEvent {
    Created { rollout: RolloutKey, rider: RiderKey },
    Updated { rollout: RolloutKey, rider: RiderKey },
    Deleted { rollout: RolloutKey, rider: RiderKey },
    Forbidden { rollout: RolloutKey, rider: RiderKey },
}
