//! LLM client used by the support agent.
//!
//! - [`LLMClient`] - The chat-with-tools trait the agent talks to
//! - [`OpenAIClient`] - OpenAI-compatible `/chat/completions` implementation
//!
//! # Example
//!
//! ```ignore
//! use techsupport::llm::{LLMClient, OpenAIClient};
//!
//! let client = OpenAIClient::from_config(&config.llm)?;
//! let reply = client.generate("What is 2+2?").await?;
//! ```

/// Core LLM client trait and response type.
pub mod client;
/// OpenAI chat-completions client.
pub mod openai;

pub use client::{LLMClient, LLMResponse};
pub use openai::OpenAIClient;
