//! Test repositories: mock progress stores and reward ledgers.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mechdeck_core::error::DomainError;
use mechdeck_core::repository::{
    ProgressRecord, ProgressRepository, RewardLedger, RewardLedgerEntry, RewardStatus,
};
use uuid::Uuid;

/// A progress repository that keeps records in memory and counts every call,
/// so tests can assert both on stored state and on how often it was touched.
#[derive(Debug, Default)]
pub struct RecordingProgressRepository {
    records: Mutex<HashMap<(Uuid, String), ProgressRecord>>,
    saves: Mutex<Vec<ProgressRecord>>,
    resets: Mutex<Vec<(Uuid, String)>>,
}

impl RecordingProgressRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository that already holds `record`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_record(record: ProgressRecord) -> Self {
        let repo = Self::default();
        repo.records
            .lock()
            .unwrap()
            .insert((record.user_id, record.story_id.clone()), record);
        repo
    }

    /// Returns a snapshot of every record passed to `save_progress`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn saved_records(&self) -> Vec<ProgressRecord> {
        self.saves.lock().unwrap().clone()
    }

    /// Returns every `(user, story)` passed to `reset_progress`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn resets(&self) -> Vec<(Uuid, String)> {
        self.resets.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProgressRepository for RecordingProgressRepository {
    async fn load_progress(
        &self,
        user_id: Uuid,
        story_id: &str,
    ) -> Result<Option<ProgressRecord>, DomainError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(&(user_id, story_id.to_owned()))
            .cloned())
    }

    async fn save_progress(&self, record: &ProgressRecord) -> Result<(), DomainError> {
        self.saves.lock().unwrap().push(record.clone());
        self.records
            .lock()
            .unwrap()
            .insert((record.user_id, record.story_id.clone()), record.clone());
        Ok(())
    }

    async fn reset_progress(&self, user_id: Uuid, story_id: &str) -> Result<(), DomainError> {
        self.resets
            .lock()
            .unwrap()
            .push((user_id, story_id.to_owned()));
        self.records
            .lock()
            .unwrap()
            .remove(&(user_id, story_id.to_owned()));
        Ok(())
    }
}

/// A progress repository that always returns a persistence error. Useful for
/// checking that gameplay continues when the store is down.
#[derive(Debug)]
pub struct FailingProgressRepository;

#[async_trait]
impl ProgressRepository for FailingProgressRepository {
    async fn load_progress(
        &self,
        _user_id: Uuid,
        _story_id: &str,
    ) -> Result<Option<ProgressRecord>, DomainError> {
        Err(DomainError::Persistence("connection refused".into()))
    }

    async fn save_progress(&self, _record: &ProgressRecord) -> Result<(), DomainError> {
        Err(DomainError::Persistence("connection refused".into()))
    }

    async fn reset_progress(&self, _user_id: Uuid, _story_id: &str) -> Result<(), DomainError> {
        Err(DomainError::Persistence("connection refused".into()))
    }
}

/// A reward ledger that records appended entries in memory.
#[derive(Debug, Default)]
pub struct RecordingRewardLedger {
    entries: Mutex<Vec<RewardLedgerEntry>>,
}

impl RecordingRewardLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all entries.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn entries(&self) -> Vec<RewardLedgerEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl RewardLedger for RecordingRewardLedger {
    async fn append(&self, entry: &RewardLedgerEntry) -> Result<(), DomainError> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn pending_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<RewardLedgerEntry>, DomainError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
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
        let mut entries = self.entries.lock().unwrap();
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

/// A reward ledger that always returns a persistence error.
#[derive(Debug)]
pub struct FailingRewardLedger;

#[async_trait]
impl RewardLedger for FailingRewardLedger {
    async fn append(&self, _entry: &RewardLedgerEntry) -> Result<(), DomainError> {
        Err(DomainError::Persistence("ledger unavailable".into()))
    }

    async fn pending_for_user(
        &self,
        _user_id: Uuid,
    ) -> Result<Vec<RewardLedgerEntry>, DomainError> {
        Err(DomainError::Persistence("ledger unavailable".into()))
    }

    async fn claim_all(
        &self,
        _user_id: Uuid,
        _claimed_at: DateTime<Utc>,
    ) -> Result<Vec<RewardLedgerEntry>, DomainError> {
        Err(DomainError::Persistence("ledger unavailable".into()))
    }
}
