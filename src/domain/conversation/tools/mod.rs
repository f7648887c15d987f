//! Tool catalog for the reasoning engine.
//!
//! A fixed set of named, schema-typed operations, each wrapping exactly
//! one capability-provider call. The registry carries the schemas bound
//! to the model; the executor dispatches requested invocations against
//! the injected providers.

mod call;
mod catalog;
mod definition;
mod executor;
mod registry;
mod result;

pub use call::ToolCall;
pub use catalog::{default_catalog, is_cart_tool, names};
pub use definition::ToolDefinition;
pub use executor::ToolExecutor;
pub use registry::ToolRegistry;
pub use result::ToolResult;
