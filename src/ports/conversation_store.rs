//! Conversation Store Port - durable per-session turn log + flow metadata.
//!
//! One document per session, replaced wholesale on every save. The store
//! never merges fields; the orchestrator owns the full document for the
//! duration of a turn (single-writer-per-turn contract).

use async_trait::async_trait;

use crate::domain::conversation::{SessionMetadata, Turn};
use crate::domain::foundation::SessionId;

/// Errors from the conversation store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session not found: {0}")]
    NotFound(SessionId),

    #[error("failed to serialize session document: {0}")]
    Serialization(String),

    #[error("database error: {0}")]
    Database(String),
}

/// A loaded session document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionRecord {
    /// Most recent turns, oldest first (bounded by the load limit).
    pub turns: Vec<Turn>,
    /// Flow metadata as last persisted.
    pub metadata: SessionMetadata,
}

/// Port for session persistence.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Loads a session, returning at most `limit` most-recent turns.
    /// Returns `None` for a session that has never been saved.
    async fn load(
        &self,
        session: &SessionId,
        limit: usize,
    ) -> Result<Option<SessionRecord>, StoreError>;

    /// Replaces the whole session document (upsert).
    async fn save(
        &self,
        session: &SessionId,
        turns: &[Turn],
        metadata: &SessionMetadata,
    ) -> Result<(), StoreError>;

    /// Lists all known session ids.
    async fn list_sessions(&self) -> Result<Vec<SessionId>, StoreError>;

    /// Deletes a session document.
    async fn delete(&self, session: &SessionId) -> Result<(), StoreError>;
}
