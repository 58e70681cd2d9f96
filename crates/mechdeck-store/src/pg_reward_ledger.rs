//! `PostgreSQL` implementation of the `RewardLedger` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use mechdeck_core::error::DomainError;
use mechdeck_core::repository::{RewardLedger, RewardLedgerEntry, RewardStatus};

use crate::persistence_error;

const ENTRY_COLUMNS: &str = "entry_id, user_id, story_id, reward_type, payload, status, \
                             dedupe_key, granted_at, claimed_at";

/// PostgreSQL-backed reward ledger.
#[derive(Debug, Clone)]
pub struct PgRewardLedger {
    pool: PgPool,
}

impl PgRewardLedger {
    /// Creates a new `PgRewardLedger`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn entry_from_row(row: &PgRow) -> Result<RewardLedgerEntry, DomainError> {
    let decode = |e: sqlx::Error| persistence_error("decode ledger entry", &e);

    let payload: Json<serde_json::Value> = row.try_get("payload").map_err(decode)?;
    let status: String = row.try_get("status").map_err(decode)?;
    let dedupe_key: String = row.try_get("dedupe_key").map_err(decode)?;

    Ok(RewardLedgerEntry {
        entry_id: row.try_get("entry_id").map_err(decode)?,
        user_id: row.try_get("user_id").map_err(decode)?,
        story_id: row.try_get("story_id").map_err(decode)?,
        reward_type: row.try_get("reward_type").map_err(decode)?,
        payload: payload.0,
        status: RewardStatus::parse(&status)?,
        dedupe_key: dedupe_key.trim_end().to_owned(),
        granted_at: row.try_get("granted_at").map_err(decode)?,
        claimed_at: row.try_get("claimed_at").map_err(decode)?,
    })
}

#[async_trait]
impl RewardLedger for PgRewardLedger {
    async fn append(&self, entry: &RewardLedgerEntry) -> Result<(), DomainError> {
        sqlx::query(
            r"
            INSERT INTO reward_ledger
                (entry_id, user_id, story_id, reward_type, payload, status, dedupe_key, granted_at, claimed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(entry.entry_id)
        .bind(entry.user_id)
        .bind(&entry.story_id)
        .bind(&entry.reward_type)
        .bind(Json(&entry.payload))
        .bind(entry.status.as_str())
        .bind(&entry.dedupe_key)
        .bind(entry.granted_at)
        .bind(entry.claimed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| persistence_error("append ledger entry", &e))?;

        Ok(())
    }

    async fn pending_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<RewardLedgerEntry>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {ENTRY_COLUMNS} FROM reward_ledger \
             WHERE user_id = $1 AND status = $2 ORDER BY granted_at, entry_id"
        ))
        .bind(user_id)
        .bind(RewardStatus::Granted.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| persistence_error("load pending rewards", &e))?;

        rows.iter().map(entry_from_row).collect()
    }

    async fn claim_all(
        &self,
        user_id: Uuid,
        claimed_at: DateTime<Utc>,
    ) -> Result<Vec<RewardLedgerEntry>, DomainError> {
        let rows = sqlx::query(&format!(
            "UPDATE reward_ledger SET status = $3, claimed_at = $4 \
             WHERE user_id = $1 AND status = $2 RETURNING {ENTRY_COLUMNS}"
        ))
        .bind(user_id)
        .bind(RewardStatus::Granted.as_str())
        .bind(RewardStatus::Claimed.as_str())
        .bind(claimed_at)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| persistence_error("claim rewards", &e))?;

        let mut claimed = rows
            .iter()
            .map(entry_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        claimed.sort_by_key(|e| (e.granted_at, e.entry_id));
        Ok(claimed)
    }
}
