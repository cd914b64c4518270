//! LLM client abstraction used by the support agent.

use crate::types::{ChatMessage, Result, ToolCall, ToolDefinition};
use async_trait::async_trait;

/// Chat model with function calling.
///
/// The agent only needs one round trip: send the conversation plus the tool
/// definitions and get back text and/or tool calls.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Send the conversation so far, offering `tools` to the model.
    async fn chat(&self, messages: &[ChatMessage], tools: &[ToolDefinition]) -> Result<LLMResponse>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;

    /// Single-turn completion without tools.
    async fn generate(&self, prompt: &str) -> Result<String> {
        let response = self.chat(&[ChatMessage::user(prompt)], &[]).await?;
        Ok(response.content)
    }
}

/// Response from an LLM generation request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LLMResponse {
    /// The text content of the response
    pub content: String,
    /// Any tool calls requested by the model
    pub tool_calls: Vec<ToolCall>,
    /// The reason generation stopped (e.g., "stop", "tool_calls", "length")
    pub finish_reason: String,
}

impl LLMResponse {
    /// A plain text answer.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: vec![],
            finish_reason: "stop".to_string(),
        }
    }

    /// A turn that only requests tool calls.
    pub fn with_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: String::new(),
            tool_calls,
            finish_reason: "tool_calls".to_string(),
        }
    }

    /// Whether the model asked for tools instead of answering.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}
