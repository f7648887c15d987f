//! Strongly-typed identifier value objects.
//!
//! All identifiers wrap the opaque string keys issued by the storefront
//! backend (document-store object ids, session keys). A session id is
//! minted locally when a client connects without one.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! opaque_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an id from an existing key.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the inner key.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true if the key is empty or whitespace-only.
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

opaque_id!(
    /// Unique identifier for a chat session.
    SessionId
);

opaque_id!(
    /// Identifier of an authenticated store customer.
    UserId
);

opaque_id!(
    /// Identifier of a product in the catalog.
    ProductId
);

opaque_id!(
    /// Identifier of a placed order.
    OrderId
);

opaque_id!(
    /// Identifier of a line item in a cart.
    CartItemId
);

opaque_id!(
    /// Identifier of a custom PC build record.
    BuildId
);

impl SessionId {
    /// Mints a fresh random session id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}
