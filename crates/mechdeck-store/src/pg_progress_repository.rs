//! `PostgreSQL` implementation of the `ProgressRepository` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use mechdeck_core::error::DomainError;
use mechdeck_core::repository::{ProgressRecord, ProgressRepository};
use mechdeck_core::value::Variables;

use crate::persistence_error;

/// PostgreSQL-backed progress store. One row per `(user_id, story_id)`.
#[derive(Debug, Clone)]
pub struct PgProgressRepository {
    pool: PgPool,
}

impl PgProgressRepository {
    /// Creates a new `PgProgressRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProgressRepository for PgProgressRepository {
    async fn load_progress(
        &self,
        user_id: Uuid,
        story_id: &str,
    ) -> Result<Option<ProgressRecord>, DomainError> {
        let row = sqlx::query(
            r"
            SELECT user_id, story_id, current_node_id, variables, last_updated
            FROM story_progress
            WHERE user_id = $1 AND story_id = $2
            ",
        )
        .bind(user_id)
        .bind(story_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| persistence_error("load progress", &e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let variables: Json<Variables> = row
            .try_get("variables")
            .map_err(|e| persistence_error("decode progress variables", &e))?;
        let last_updated: DateTime<Utc> = row
            .try_get("last_updated")
            .map_err(|e| persistence_error("decode progress timestamp", &e))?;

        Ok(Some(ProgressRecord {
            user_id: row
                .try_get("user_id")
                .map_err(|e| persistence_error("decode progress user", &e))?,
            story_id: row
                .try_get("story_id")
                .map_err(|e| persistence_error("decode progress story", &e))?,
            current_node_id: row
                .try_get("current_node_id")
                .map_err(|e| persistence_error("decode progress node", &e))?,
            variables: variables.0,
            last_updated,
        }))
    }

    async fn save_progress(&self, record: &ProgressRecord) -> Result<(), DomainError> {
        sqlx::query(
            r"
            INSERT INTO story_progress (user_id, story_id, current_node_id, variables, last_updated)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, story_id) DO UPDATE
            SET current_node_id = EXCLUDED.current_node_id,
                variables       = EXCLUDED.variables,
                last_updated    = EXCLUDED.last_updated
            ",
        )
        .bind(record.user_id)
        .bind(&record.story_id)
        .bind(&record.current_node_id)
        .bind(Json(&record.variables))
        .bind(record.last_updated)
        .execute(&self.pool)
        .await
        .map_err(|e| persistence_error("save progress", &e))?;

        Ok(())
    }

    async fn reset_progress(&self, user_id: Uuid, story_id: &str) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM story_progress WHERE user_id = $1 AND story_id = $2")
            .bind(user_id)
            .bind(story_id)
            .execute(&self.pool)
            .await
            .map_err(|e| persistence_error("reset progress", &e))?;

        Ok(())
    }
}
