//! In-memory conversation store.
//!
//! Whole-document semantics matching the production store: save replaces
//! the session document, load returns the most recent turns. Used by
//! tests and local development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::conversation::{SessionMetadata, Turn};
use crate::domain::foundation::SessionId;
use crate::ports::{ConversationStore, SessionRecord, StoreError};

/// In-memory implementation of [`ConversationStore`].
#[derive(Debug, Default)]
pub struct InMemoryConversationStore {
    sessions: Mutex<HashMap<SessionId, SessionRecord>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn load(
        &self,
        session: &SessionId,
        limit: usize,
    ) -> Result<Option<SessionRecord>, StoreError> {
        let sessions = self.sessions.lock().unwrap();
        Ok(sessions.get(session).map(|record| {
            let turns = if record.turns.len() > limit {
                record.turns[record.turns.len() - limit..].to_vec()
            } else {
                record.turns.clone()
            };
            SessionRecord {
                turns,
                metadata: record.metadata.clone(),
            }
        }))
    }

    async fn save(
        &self,
        session: &SessionId,
        turns: &[Turn],
        metadata: &SessionMetadata,
    ) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().unwrap();
        sessions.insert(
            session.clone(),
            SessionRecord {
                turns: turns.to_vec(),
                metadata: metadata.clone(),
            },
        );
        Ok(())
    }

    async fn list_sessions(&self) -> Result<Vec<SessionId>, StoreError> {
        Ok(self.sessions.lock().unwrap().keys().cloned().collect())
    }

    async fn delete(&self, session: &SessionId) -> Result<(), StoreError> {
        self.sessions.lock().unwrap().remove(session);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::checkout::{CheckoutState, CheckoutStep};

    fn session() -> SessionId {
        SessionId::new("s-1")
    }

    #[tokio::test]
    async fn load_of_unknown_session_is_none() {
        let store = InMemoryConversationStore::new();
        assert!(store.load(&session(), 10).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_then_load_round_trips_metadata() {
        let store = InMemoryConversationStore::new();
        let turns = vec![Turn::user("checkout"), Turn::assistant("pick an address")];
        let metadata = SessionMetadata {
            checkout: CheckoutState::enter(),
            ..Default::default()
        };

        store.save(&session(), &turns, &metadata).await.unwrap();
        let record = store.load(&session(), 10).await.unwrap().unwrap();

        assert_eq!(record.turns.len(), 2);
        assert!(record.metadata.checkout.is_active());
        assert_eq!(record.metadata.checkout.step, CheckoutStep::Shipping);
    }

    #[tokio::test]
    async fn load_applies_the_limit_keeping_newest() {
        let store = InMemoryConversationStore::new();
        let turns: Vec<Turn> = (0..10).map(|i| Turn::user(format!("m{i}"))).collect();
        store
            .save(&session(), &turns, &SessionMetadata::default())
            .await
            .unwrap();

        let record = store.load(&session(), 3).await.unwrap().unwrap();
        assert_eq!(record.turns.len(), 3);
        assert_eq!(record.turns[0].content, "m7");
    }

    #[tokio::test]
    async fn save_replaces_the_whole_document() {
        let store = InMemoryConversationStore::new();
        store
            .save(&session(), &[Turn::user("a")], &SessionMetadata::default())
            .await
            .unwrap();
        store
            .save(&session(), &[Turn::user("b")], &SessionMetadata::default())
            .await
            .unwrap();

        let record = store.load(&session(), 10).await.unwrap().unwrap();
        assert_eq!(record.turns.len(), 1);
        assert_eq!(record.turns[0].content, "b");
    }

    #[tokio::test]
    async fn delete_removes_the_session() {
        let store = InMemoryConversationStore::new();
        store
            .save(&session(), &[], &SessionMetadata::default())
            .await
            .unwrap();
        assert_eq!(store.session_count(), 1);

        store.delete(&session()).await.unwrap();
        assert!(store.load(&session(), 10).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_sessions_names_every_saved_session() {
        let store = InMemoryConversationStore::new();
        store
            .save(&SessionId::new("a"), &[], &SessionMetadata::default())
            .await
            .unwrap();
        store
            .save(&SessionId::new("b"), &[], &SessionMetadata::default())
            .await
            .unwrap();

        let mut ids: Vec<String> = store
            .list_sessions()
            .await
            .unwrap()
            .iter()
            .map(|s| s.to_string())
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
