//! Conversation domain: turns, per-session flow metadata, routing, and
//! the tool catalog the reasoning engine may invoke.

pub mod input;
mod metadata;
mod router;
pub mod tools;
mod turn;

pub use metadata::{ActiveFlow, SessionMetadata};
pub use router::{route, RouteTarget};
pub use turn::{truncate_for_save, Turn, TurnRole, MAX_PERSISTED_TURNS, RELOAD_WINDOW};
