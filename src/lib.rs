//! # techsupport - Tech-Support Tool-Calling Agent
//!
//! A tech-support assistant built as a thin tool-calling layer around a hosted
//! LLM, plus the tools the model may call: math evaluation, file I/O, web
//! search and a lookup of similar past support tickets in a vector database.
//!
//! ## Overview
//!
//! The crate can be used in two ways:
//!
//! 1. **As a CLI** - Run the `techsupport-agent` binary
//! 2. **As a library** - Use the tools, registry and agent from your own code
//!
//! ### Using Tools
//!
//! ```rust,ignore
//! use techsupport::{AppConfig, ToolRegistry};
//! use techsupport::types::ToolCall;
//! use serde_json::json;
//!
//! let registry = ToolRegistry::with_config(&AppConfig::default());
//!
//! // Definitions to hand to the model
//! let definitions = registry.list_tools();
//!
//! // Every invocation returns a string; failures start with "Error"
//! let call = ToolCall::new("MathTool", json!({"expression": "sqrt(16)"}));
//! assert_eq!(registry.invoke(&call).await, "Result: 4.0");
//! ```
//!
//! ### Running the Agent
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use techsupport::{AppConfig, OpenAIClient, SupportAgent, ToolRegistry};
//!
//! let config = AppConfig::load(None)?;
//! let llm = Arc::new(OpenAIClient::from_config(&config.llm)?);
//! let tools = Arc::new(ToolRegistry::with_config(&config));
//! let agent = SupportAgent::from_config(llm, tools, &config.llm);
//!
//! let response = agent.ask("What is 15 + 27?").await?;
//! println!("{}", response.content);
//! ```
//!
//! ## Modules
//!
//! - [`agents`] - The support agent's tool-calling loop
//! - [`cli`] - Command-line interface
//! - [`db`] - Vector store boundary and the Weaviate connector
//! - [`llm`] - LLM client trait and the OpenAI client
//! - [`tools`] - Tool contract, registry and built-in tools
//! - [`types`] - Common types and error definitions
//! - [`utils`] - Configuration and logging

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

/// Support agent.
pub mod agents;
/// Command-line interface.
pub mod cli;
/// Vector store access.
pub mod db;
/// LLM clients.
pub mod llm;
/// Tools and the tool registry.
pub mod tools;
/// Shared types and errors.
pub mod types;
/// Configuration and logging.
pub mod utils;

pub use agents::{AgentResponse, SupportAgent};
pub use llm::{LLMClient, LLMResponse, OpenAIClient};
pub use tools::registry::{Tool, ToolError, ToolKind, ToolRegistry};
pub use types::{AppError, Result};
pub use utils::toml_config::AppConfig;
