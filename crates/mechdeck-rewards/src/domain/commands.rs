//! Commands for the Rewards context.

use std::collections::BTreeMap;

use mechdeck_core::command::Command;
use mechdeck_core::reward::RewardIntent;
use uuid::Uuid;

/// Command to resolve queued reward intents for a player.
#[derive(Debug, Clone)]
pub struct ProcessRewards {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The player.
    pub user_id: Uuid,
    /// Story that queued the rewards.
    pub story_id: String,
    /// Intents in the order they were queued.
    pub intents: Vec<RewardIntent>,
}

impl Command for ProcessRewards {
    fn command_type(&self) -> &'static str {
        "rewards.process_rewards"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn user_id(&self) -> Uuid {
        self.user_id
    }
}

/// Command to mark every granted ledger entry of a player as claimed.
#[derive(Debug, Clone)]
pub struct ClaimRewards {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The player.
    pub user_id: Uuid,
}

impl Command for ClaimRewards {
    fn command_type(&self) -> &'static str {
        "rewards.claim_rewards"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn user_id(&self) -> Uuid {
        self.user_id
    }
}

/// Command to set or clear the live battle-mech stats of a player.
#[derive(Debug, Clone)]
pub struct SyncMechStats {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The player.
    pub user_id: Uuid,
    /// New stats; `None` when the player is out of battle.
    pub stats: Option<BTreeMap<String, i64>>,
}

impl Command for SyncMechStats {
    fn command_type(&self) -> &'static str {
        "rewards.sync_mech_stats"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn user_id(&self) -> Uuid {
        self.user_id
    }
}
