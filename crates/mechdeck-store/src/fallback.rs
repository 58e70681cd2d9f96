//! Progress store wrapper that keeps play going when the backing store fails.
//!
//! The last record seen for each `(user_id, story_id)` is held in memory.
//! Writes that the backing store rejects stay marked unsynced, and loads
//! prefer them over the store until a later write succeeds.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::warn;
use uuid::Uuid;

use mechdeck_core::error::DomainError;
use mechdeck_core::repository::{ProgressRecord, ProgressRepository};

use crate::memory::lock;

#[derive(Debug, Clone)]
struct CachedProgress {
    /// `None` after a reset.
    record: Option<ProgressRecord>,
    /// True while the backing store has not accepted this state.
    unsynced: bool,
}

/// Write-through progress store with an in-memory fallback.
///
/// Save and reset failures are still returned to the caller so it can report
/// them, but the in-memory copy is updated first.
pub struct FallbackProgressRepository {
    inner: Arc<dyn ProgressRepository>,
    cache: Mutex<HashMap<(Uuid, String), CachedProgress>>,
}

impl FallbackProgressRepository {
    /// Wraps `inner`.
    #[must_use]
    pub fn new(inner: Arc<dyn ProgressRepository>) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn cached(&self, user_id: Uuid, story_id: &str) -> Result<Option<CachedProgress>, DomainError> {
        let cache = lock(&self.cache, "progress cache")?;
        Ok(cache.get(&(user_id, story_id.to_owned())).cloned())
    }

    fn remember(
        &self,
        user_id: Uuid,
        story_id: &str,
        record: Option<ProgressRecord>,
        unsynced: bool,
    ) -> Result<(), DomainError> {
        let mut cache = lock(&self.cache, "progress cache")?;
        cache.insert(
            (user_id, story_id.to_owned()),
            CachedProgress { record, unsynced },
        );
        Ok(())
    }
}

#[async_trait]
impl ProgressRepository for FallbackProgressRepository {
    async fn load_progress(
        &self,
        user_id: Uuid,
        story_id: &str,
    ) -> Result<Option<ProgressRecord>, DomainError> {
        let cached = self.cached(user_id, story_id)?;
        if let Some(entry) = cached.as_ref().filter(|e| e.unsynced) {
            return Ok(entry.record.clone());
        }

        match self.inner.load_progress(user_id, story_id).await {
            Ok(record) => {
                self.remember(user_id, story_id, record.clone(), false)?;
                Ok(record)
            }
            Err(e) => match cached {
                Some(entry) => {
                    warn!(%user_id, %story_id, error = %e, "progress load failed; using in-memory copy");
                    Ok(entry.record)
                }
                None => Err(e),
            },
        }
    }

    async fn save_progress(&self, record: &ProgressRecord) -> Result<(), DomainError> {
        self.remember(record.user_id, &record.story_id, Some(record.clone()), true)?;
        self.inner.save_progress(record).await?;
        self.remember(record.user_id, &record.story_id, Some(record.clone()), false)
    }

    async fn reset_progress(&self, user_id: Uuid, story_id: &str) -> Result<(), DomainError> {
        self.remember(user_id, story_id, None, true)?;
        self.inner.reset_progress(user_id, story_id).await?;
        self.remember(user_id, story_id, None, false)
    }
}
