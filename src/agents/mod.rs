//! Agents that drive the tools.

/// The tech-support agent and its tool loop.
pub mod support;

pub use support::{AgentResponse, SupportAgent, DEFAULT_SYSTEM_PROMPT};
