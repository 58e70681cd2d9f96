//! Persistence abstractions: story progress and the reward ledger.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::value::Variables;

/// Where a player stands in one story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// The player.
    pub user_id: Uuid,
    /// The story.
    pub story_id: String,
    /// Node the player is currently at.
    pub current_node_id: String,
    /// Variable snapshot at that node.
    pub variables: Variables,
    /// When the record was last written.
    pub last_updated: DateTime<Utc>,
}

/// Repository for per-(user, story) progress records.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Loads progress; `Ok(None)` when the player has not started the story.
    async fn load_progress(
        &self,
        user_id: Uuid,
        story_id: &str,
    ) -> Result<Option<ProgressRecord>, DomainError>;

    /// Inserts or replaces the record for `(record.user_id, record.story_id)`.
    async fn save_progress(&self, record: &ProgressRecord) -> Result<(), DomainError>;

    /// Deletes the record, if any.
    async fn reset_progress(&self, user_id: Uuid, story_id: &str) -> Result<(), DomainError>;
}

/// Lifecycle of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardStatus {
    /// Applied to the player but not yet acknowledged.
    Granted,
    /// Acknowledged by the player.
    Claimed,
}

impl RewardStatus {
    /// Column value used by SQL stores.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::Claimed => "claimed",
        }
    }

    /// Parses a column value.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Persistence` for unknown values.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value {
            "granted" => Ok(Self::Granted),
            "claimed" => Ok(Self::Claimed),
            other => Err(DomainError::Persistence(format!(
                "unknown reward status: {other}"
            ))),
        }
    }
}

/// One granted reward in the append-only ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardLedgerEntry {
    /// Entry identifier.
    pub entry_id: Uuid,
    /// The player.
    pub user_id: Uuid,
    /// Story that granted the reward.
    pub story_id: String,
    /// Intent kind, e.g. `card_pack`.
    pub reward_type: String,
    /// The intent plus what it resolved to.
    pub payload: serde_json::Value,
    /// Granted or claimed.
    pub status: RewardStatus,
    /// Hash over (user, story, payload); recorded, not enforced unique.
    pub dedupe_key: String,
    /// When the reward was granted.
    pub granted_at: DateTime<Utc>,
    /// When the player claimed it.
    pub claimed_at: Option<DateTime<Utc>>,
}

/// Append-only reward ledger.
#[async_trait]
pub trait RewardLedger: Send + Sync {
    /// Appends an entry.
    async fn append(&self, entry: &RewardLedgerEntry) -> Result<(), DomainError>;

    /// Entries for `user_id` still in `Granted` status, oldest first.
    async fn pending_for_user(&self, user_id: Uuid)
    -> Result<Vec<RewardLedgerEntry>, DomainError>;

    /// Marks every granted entry of `user_id` as claimed and returns them.
    async fn claim_all(
        &self,
        user_id: Uuid,
        claimed_at: DateTime<Utc>,
    ) -> Result<Vec<RewardLedgerEntry>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reward_status_round_trips_through_column_value() {
        for status in [RewardStatus::Granted, RewardStatus::Claimed] {
            assert_eq!(RewardStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(matches!(
            RewardStatus::parse("lost"),
            Err(DomainError::Persistence(_))
        ));
    }
}
