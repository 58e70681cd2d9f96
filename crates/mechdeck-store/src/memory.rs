//! In-memory progress store and reward ledger.
//!
//! Used when no database is configured. State lives for the life of the
//! process.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use mechdeck_core::error::DomainError;
use mechdeck_core::repository::{
    ProgressRecord, ProgressRepository, RewardLedger, RewardLedgerEntry, RewardStatus,
};

pub(crate) fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>, DomainError> {
    mutex
        .lock()
        .map_err(|e| DomainError::Infrastructure(format!("{what} mutex poisoned: {e}")))
}

/// Progress records keyed by `(user_id, story_id)`.
#[derive(Debug, Default)]
pub struct InMemoryProgressRepository {
    records: Mutex<HashMap<(Uuid, String), ProgressRecord>>,
}

impl InMemoryProgressRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressRepository for InMemoryProgressRepository {
    async fn load_progress(
        &self,
        user_id: Uuid,
        story_id: &str,
    ) -> Result<Option<ProgressRecord>, DomainError> {
        let records = lock(&self.records, "progress")?;
        Ok(records.get(&(user_id, story_id.to_owned())).cloned())
    }

    async fn save_progress(&self, record: &ProgressRecord) -> Result<(), DomainError> {
        let mut records = lock(&self.records, "progress")?;
        records.insert((record.user_id, record.story_id.clone()), record.clone());
        Ok(())
    }

    async fn reset_progress(&self, user_id: Uuid, story_id: &str) -> Result<(), DomainError> {
        let mut records = lock(&self.records, "progress")?;
        records.remove(&(user_id, story_id.to_owned()));
        Ok(())
    }
}

/// Ledger entries in append order.
#[derive(Debug, Default)]
pub struct InMemoryRewardLedger {
    entries: Mutex<Vec<RewardLedgerEntry>>,
}

impl InMemoryRewardLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RewardLedger for InMemoryRewardLedger {
    async fn append(&self, entry: &RewardLedgerEntry) -> Result<(), DomainError> {
        lock(&self.entries, "ledger")?.push(entry.clone());
        Ok(())
    }

    async fn pending_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<RewardLedgerEntry>, DomainError> {
        let entries = lock(&self.entries, "ledger")?;
        Ok(entries
            .iter()
            .filter(|e| e.user_id == user_id && e.status == RewardStatus::Granted)
            .cloned()
            .collect())
    }

    async fn claim_all(
        &self,
        user_id: Uuid,
        claimed_at: DateTime<Utc>,
    ) -> Result<Vec<RewardLedgerEntry>, DomainError> {
        let mut entries = lock(&self.entries, "ledger")?;
        let mut claimed = Vec::new();
        for entry in entries
            .iter_mut()
            .filter(|e| e.user_id == user_id && e.status == RewardStatus::Granted)
        {
            entry.status = RewardStatus::Claimed;
            entry.claimed_at = Some(claimed_at);
            claimed.push(entry.clone());
        }
        Ok(claimed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mechdeck_core::value::{VarValue, Variables};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    fn record(user_id: Uuid, node: &str) -> ProgressRecord {
        let mut variables = Variables::new();
        variables.insert("reputation".into(), VarValue::Number(4.0));
        ProgressRecord {
            user_id,
            story_id: "hangar".into(),
            current_node_id: node.into(),
            variables,
            last_updated: now(),
        }
    }

    fn entry(user_id: Uuid) -> RewardLedgerEntry {
        RewardLedgerEntry {
            entry_id: Uuid::new_v4(),
            user_id,
            story_id: "hangar".into(),
            reward_type: "currency".into(),
            payload: serde_json::json!({"intent": {"type": "currency", "amount": 5}}),
            status: RewardStatus::Granted,
            dedupe_key: "k".repeat(64),
            granted_at: now(),
            claimed_at: None,
        }
    }

    #[tokio::test]
    async fn test_missing_progress_is_none() {
        let repo = InMemoryProgressRepository::new();

        let loaded = repo.load_progress(Uuid::new_v4(), "hangar").await.unwrap();

        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_save_upserts_per_user_and_story() {
        // Arrange
        let repo = InMemoryProgressRepository::new();
        let user_id = Uuid::new_v4();

        // Act
        repo.save_progress(&record(user_id, "start")).await.unwrap();
        repo.save_progress(&record(user_id, "bay")).await.unwrap();

        // Assert
        let loaded = repo.load_progress(user_id, "hangar").await.unwrap().unwrap();
        assert_eq!(loaded.current_node_id, "bay");
        assert_eq!(loaded.variables["reputation"], VarValue::Number(4.0));
        assert!(repo.load_progress(user_id, "other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reset_deletes_only_that_story() {
        let repo = InMemoryProgressRepository::new();
        let user_id = Uuid::new_v4();
        repo.save_progress(&record(user_id, "start")).await.unwrap();
        let mut other = record(user_id, "start");
        other.story_id = "dock".into();
        repo.save_progress(&other).await.unwrap();

        repo.reset_progress(user_id, "hangar").await.unwrap();

        assert!(repo.load_progress(user_id, "hangar").await.unwrap().is_none());
        assert!(repo.load_progress(user_id, "dock").await.unwrap().is_some());
        repo.reset_progress(user_id, "hangar").await.unwrap();
    }

    #[tokio::test]
    async fn test_ledger_claims_only_that_users_granted_entries() {
        // Arrange
        let ledger = InMemoryRewardLedger::new();
        let user_id = Uuid::new_v4();
        let someone_else = Uuid::new_v4();
        ledger.append(&entry(user_id)).await.unwrap();
        ledger.append(&entry(user_id)).await.unwrap();
        ledger.append(&entry(someone_else)).await.unwrap();

        // Act
        let claimed = ledger.claim_all(user_id, now()).await.unwrap();
        let claimed_again = ledger.claim_all(user_id, now()).await.unwrap();

        // Assert
        assert_eq!(claimed.len(), 2);
        assert!(claimed.iter().all(|e| e.status == RewardStatus::Claimed));
        assert!(claimed_again.is_empty());
        assert!(ledger.pending_for_user(user_id).await.unwrap().is_empty());
        assert_eq!(ledger.pending_for_user(someone_else).await.unwrap().len(), 1);
    }
}
