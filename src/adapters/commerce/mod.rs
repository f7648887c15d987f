//! Commerce capability-provider adapters.

mod http_client;
mod in_memory;

pub use http_client::{HttpCommerceClient, HttpCommerceConfig};
pub use in_memory::InMemoryCommerce;
