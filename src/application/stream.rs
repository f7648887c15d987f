//! Simulated streaming of an already-computed reply.
//!
//! The turn runs to completion first; the final answer is then flushed
//! word by word with a small fixed delay. This is cosmetic pacing for
//! the client, not a concurrency primitive.

use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::domain::foundation::{SessionId, UserId};

use super::SessionOrchestrator;

/// Delay between streamed words.
const WORD_DELAY: Duration = Duration::from_millis(30);

/// Events emitted by the streaming chat surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChatEvent {
    Status {
        content: String,
        session_id: SessionId,
    },
    Content {
        content: String,
        session_id: SessionId,
        needs_approval: bool,
        is_partial: bool,
    },
    Complete {
        content: String,
        session_id: SessionId,
        needs_approval: bool,
    },
    Error {
        content: String,
        session_id: SessionId,
    },
}

/// Runs one turn and yields status, incremental content, and a final
/// completion event.
pub fn stream_turn(
    orchestrator: Arc<SessionOrchestrator>,
    session: SessionId,
    user: Option<UserId>,
    user_input: String,
) -> impl Stream<Item = ChatEvent> + Send {
    let (tx, rx) = mpsc::channel::<ChatEvent>(16);

    tokio::spawn(async move {
        let _ = tx
            .send(ChatEvent::Status {
                content: "Processing your message...".to_string(),
                session_id: session.clone(),
            })
            .await;

        let turn = orchestrator
            .handle_message(&session, user, &user_input)
            .await;

        let words: Vec<&str> = turn.reply.split_whitespace().collect();
        if words.is_empty() {
            let _ = tx
                .send(ChatEvent::Error {
                    content: "I couldn't generate a response. Please try again.".to_string(),
                    session_id: session.clone(),
                })
                .await;
            return;
        }

        let _ = tx
            .send(ChatEvent::Status {
                content: "Generating response...".to_string(),
                session_id: session.clone(),
            })
            .await;

        let mut streamed = String::new();
        for (i, word) in words.iter().enumerate() {
            if !streamed.is_empty() {
                streamed.push(' ');
            }
            streamed.push_str(word);

            let event = ChatEvent::Content {
                content: streamed.clone(),
                session_id: session.clone(),
                needs_approval: turn.needs_approval,
                is_partial: i < words.len() - 1,
            };
            if tx.send(event).await.is_err() {
                return; // client went away
            }
            tokio::time::sleep(WORD_DELAY).await;
        }

        let _ = tx
            .send(ChatEvent::Complete {
                content: turn.reply,
                session_id: session,
                needs_approval: turn.needs_approval,
            })
            .await;
    });

    futures::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|event| (event, rx))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let event = ChatEvent::Complete {
            content: "done".to_string(),
            session_id: SessionId::new("s-1"),
            needs_approval: false,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "complete");
        assert_eq!(json["content"], "done");
        assert_eq!(json["needs_approval"], false);
    }

    #[test]
    fn partial_flag_serializes() {
        let event = ChatEvent::Content {
            content: "partial words".to_string(),
            session_id: SessionId::new("s-1"),
            needs_approval: false,
            is_partial: true,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "content");
        assert_eq!(json["is_partial"], true);
    }
}
