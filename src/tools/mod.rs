//! Tools the support agent can call.
//!
//! # Module Structure
//!
//! - [`registry`](crate::tools::registry) - The `Tool` contract, typed tool errors and the registry
//! - [`math`](crate::tools::math) - Arithmetic with a fixed set of math functions
//! - [`file`](crate::tools::file) - Read, write, list and existence checks
//! - [`web_search`](crate::tools::web_search) - Instant-answer web search
//! - [`ticket_search`](crate::tools::ticket_search) - Nearest past support ticket from a vector store
//!
//! Every tool returns a single string to the model. Failures render as text
//! starting with `Error`:
//!
//! ```ignore
//! let registry = ToolRegistry::with_config(&config);
//! let call = ToolCall::new("MathTool", json!({"expression": "2 + 2"}));
//! assert_eq!(registry.invoke(&call).await, "Result: 4");
//! ```

/// Expression lexer, parser and evaluator behind the math tool.
pub mod expression;
/// File operations tool.
pub mod file;
/// Math tool.
pub mod math;
/// Tool contract and registry.
pub mod registry;
/// Similar-ticket lookup tool.
pub mod ticket_search;
/// Web search tool.
pub mod web_search;

pub use registry::{ErrorKind, Tool, ToolError, ToolKind, ToolOutcome, ToolRegistry};
