//! The tech-support agent: a sequential tool-calling loop over an [`LLMClient`].

use crate::llm::client::LLMClient;
use crate::tools::registry::ToolRegistry;
use crate::types::{AppError, ChatMessage, Result, ToolCallRecord};
use crate::utils::toml_config::LlmConfig;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Prompt used when the configuration does not supply one.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful tech support assistant with access to various tools. \
You can perform calculations, search the web, and work with files. \
Use the available tools to help users with their requests.";

/// Final answer of one agent run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    /// The model's final reply.
    pub content: String,
    /// Every tool call made along the way, in order.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Model round trips used.
    pub iterations: usize,
}

/// Tech-support agent: one LLM, the four support tools and a system prompt.
pub struct SupportAgent {
    llm: Arc<dyn LLMClient>,
    tools: Arc<ToolRegistry>,
    system_prompt: String,
    max_tool_iterations: usize,
}

impl SupportAgent {
    /// Agent that stops after `max_tool_iterations` model round trips.
    pub fn new(
        llm: Arc<dyn LLMClient>,
        tools: Arc<ToolRegistry>,
        system_prompt: impl Into<String>,
        max_tool_iterations: usize,
    ) -> Self {
        Self {
            llm,
            tools,
            system_prompt: system_prompt.into(),
            max_tool_iterations,
        }
    }

    /// Create with the prompt and iteration cap from `config`.
    pub fn from_config(llm: Arc<dyn LLMClient>, tools: Arc<ToolRegistry>, config: &LlmConfig) -> Self {
        let prompt = config
            .system_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());
        Self::new(llm, tools, prompt, config.max_tool_iterations)
    }

    /// Prompt sent as the first message of every conversation.
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Tools offered to the model.
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Answer one request, running whatever tools the model asks for.
    pub async fn ask(&self, request: &str) -> Result<AgentResponse> {
        let definitions = self.tools.list_tools();
        let mut messages = vec![
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(request),
        ];
        let mut records = Vec::new();
        let mut iterations = 0;

        loop {
            iterations += 1;
            if iterations > self.max_tool_iterations {
                return Err(AppError::LLM(format!(
                    "Max tool iterations ({}) exceeded",
                    self.max_tool_iterations
                )));
            }

            let response = self.llm.chat(&messages, &definitions).await?;
            tracing::debug!(
                iteration = iterations,
                tool_calls = response.tool_calls.len(),
                finish_reason = %response.finish_reason,
                "Model turn"
            );

            if !response.has_tool_calls() {
                return Ok(AgentResponse {
                    content: response.content,
                    tool_calls: records,
                    iterations,
                });
            }

            messages.push(ChatMessage::assistant(
                response.content.clone(),
                response.tool_calls.clone(),
            ));

            // One at a time, in the order the model listed them
            for call in &response.tool_calls {
                let started_at = Utc::now();
                let start = Instant::now();
                let outcome = self.tools.dispatch(call).await;
                let duration_ms = start.elapsed().as_millis() as u64;

                let (result, success) = match outcome {
                    Ok(output) => (output, true),
                    Err(e) => (e.to_string(), false),
                };

                messages.push(ChatMessage::tool(call.id.clone(), result.clone()));
                records.push(ToolCallRecord {
                    id: call.id.clone(),
                    name: call.name.clone(),
                    arguments: call.arguments.clone(),
                    result,
                    success,
                    started_at,
                    duration_ms,
                });
            }
        }
    }
}
