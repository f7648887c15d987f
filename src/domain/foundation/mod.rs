//! Foundation types shared across the domain layer.

mod ids;
mod timestamp;

pub use ids::{BuildId, CartItemId, OrderId, ProductId, SessionId, UserId};
pub use timestamp::Timestamp;
