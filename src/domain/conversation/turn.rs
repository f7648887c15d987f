//! Conversation turns and retention limits.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Persisted turn log cap; older turns are dropped on every save to bound
/// storage growth.
pub const MAX_PERSISTED_TURNS: usize = 50;

/// How many turns are reloaded into working state for a new turn. Kept
/// deliberately small to bound token cost and latency.
pub const RELOAD_WINDOW: usize = 6;

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One immutable entry in the conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
    pub timestamp: Timestamp,
}

impl Turn {
    /// Creates a user turn stamped now.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
            timestamp: Timestamp::now(),
        }
    }

    /// Creates an assistant turn stamped now.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
            timestamp: Timestamp::now(),
        }
    }
}

/// Drops the oldest turns so at most [`MAX_PERSISTED_TURNS`] remain.
pub fn truncate_for_save(turns: &mut Vec<Turn>) {
    if turns.len() > MAX_PERSISTED_TURNS {
        let excess = turns.len() - MAX_PERSISTED_TURNS;
        turns.drain(..excess);
    }
}
