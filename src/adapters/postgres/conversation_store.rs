//! PostgreSQL implementation of ConversationStore.
//!
//! One row per session holding the turn log and flow metadata as JSONB,
//! replaced wholesale on every save (upsert). This matches the
//! single-writer-per-turn contract: no field-level locking, last write
//! wins.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::conversation::{SessionMetadata, Turn};
use crate::domain::foundation::SessionId;
use crate::ports::{ConversationStore, SessionRecord, StoreError};

/// PostgreSQL implementation of [`ConversationStore`].
#[derive(Clone)]
pub struct PostgresConversationStore {
    pool: PgPool,
}

impl PostgresConversationStore {
    /// Creates a new PostgresConversationStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the backing table if it does not exist.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS conversations (
                session_id   TEXT PRIMARY KEY,
                turns        JSONB NOT NULL DEFAULT '[]'::jsonb,
                metadata     JSONB NOT NULL DEFAULT '{}'::jsonb,
                last_updated TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to create schema: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl ConversationStore for PostgresConversationStore {
    async fn load(
        &self,
        session: &SessionId,
        limit: usize,
    ) -> Result<Option<SessionRecord>, StoreError> {
        let row = sqlx::query(
            "SELECT turns, metadata FROM conversations WHERE session_id = $1",
        )
        .bind(session.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to load session: {e}")))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let turns_json: serde_json::Value = row
            .try_get("turns")
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let metadata_json: serde_json::Value = row
            .try_get("metadata")
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut turns: Vec<Turn> = serde_json::from_value(turns_json)
            .map_err(|e| StoreError::Serialization(format!("Bad turn log: {e}")))?;
        let metadata: SessionMetadata = serde_json::from_value(metadata_json)
            .map_err(|e| StoreError::Serialization(format!("Bad metadata: {e}")))?;

        if turns.len() > limit {
            turns = turns.split_off(turns.len() - limit);
        }

        Ok(Some(SessionRecord { turns, metadata }))
    }

    async fn save(
        &self,
        session: &SessionId,
        turns: &[Turn],
        metadata: &SessionMetadata,
    ) -> Result<(), StoreError> {
        let turns_json = serde_json::to_value(turns)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let metadata_json = serde_json::to_value(metadata)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO conversations (session_id, turns, metadata, last_updated)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (session_id) DO UPDATE SET
                turns = EXCLUDED.turns,
                metadata = EXCLUDED.metadata,
                last_updated = now()
            "#,
        )
        .bind(session.as_str())
        .bind(turns_json)
        .bind(metadata_json)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to save session: {e}")))?;

        Ok(())
    }

    async fn list_sessions(&self) -> Result<Vec<SessionId>, StoreError> {
        let rows = sqlx::query("SELECT session_id FROM conversations ORDER BY last_updated DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Database(format!("Failed to list sessions: {e}")))?;

        rows.iter()
            .map(|row| {
                row.try_get::<String, _>("session_id")
                    .map(SessionId::new)
                    .map_err(|e| StoreError::Database(e.to_string()))
            })
            .collect()
    }

    async fn delete(&self, session: &SessionId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM conversations WHERE session_id = $1")
            .bind(session.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(format!("Failed to delete session: {e}")))?;
        Ok(())
    }
}
