//! HTTP surface adapters.

pub mod chat;
