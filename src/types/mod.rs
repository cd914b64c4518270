use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============= Tool Types =============

/// Agent-facing description of a tool: name, description and JSON parameter schema.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ToolDefinition {
    /// Name the model calls the tool by.
    pub name: String,
    /// What the tool does, written for the model.
    pub description: String,
    /// JSON Schema of the arguments.
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Names listed under `properties` in the parameter schema.
    pub fn property_names(&self) -> Vec<String> {
        self.parameters
            .get("properties")
            .and_then(|p| p.as_object())
            .map(|props| props.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Names listed under `required` in the parameter schema.
    pub fn required_properties(&self) -> Vec<String> {
        self.parameters
            .get("required")
            .and_then(|r| r.as_array())
            .map(|required| {
                required
                    .iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// A single request to run a tool, as produced by the model.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ToolCall {
    /// Provider-assigned call id, echoed back on the tool message.
    pub id: String,
    /// Tool name.
    pub name: String,
    /// Arguments object.
    pub arguments: serde_json::Value,
}

impl ToolCall {
    /// Build a call with a freshly generated id.
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            id: format!("call_{}", uuid::Uuid::new_v4().simple()),
            name: name.into(),
            arguments,
        }
    }
}

/// Log entry for a tool call made during an agent run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Id of the [`ToolCall`].
    pub id: String,
    /// Tool that was called.
    pub name: String,
    /// Arguments as the model sent them.
    pub arguments: serde_json::Value,
    /// The string handed back to the model.
    pub result: String,
    /// False when the result is an error message.
    pub success: bool,
    /// When the call started.
    pub started_at: DateTime<Utc>,
    /// Wall time of the call.
    pub duration_ms: u64,
}

/// Best match returned by the similar-ticket lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMatch {
    /// The ticket as it was first reported.
    pub original_message: String,
    /// Replies that solved it.
    pub solution_text: String,
}

impl std::fmt::Display for SearchMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "📋 Original Issue:\n{}\n\n💡 Solution:\n{}",
            self.original_message, self.solution_text
        )
    }
}

// ============= Chat Types =============

/// Author of a [`ChatMessage`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Instructions for the model.
    System,
    /// The person asking for help.
    User,
    /// The model.
    Assistant,
    /// Result of a tool call.
    Tool,
}

/// One message in an agent conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// Who wrote the message.
    pub role: MessageRole,
    /// Text of the message. Empty for an assistant turn that only calls tools.
    pub content: String,
    /// Tool calls requested by the assistant in this turn.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Set on tool messages: the call this result answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    /// System prompt.
    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(MessageRole::System, content)
    }

    /// User turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(MessageRole::User, content)
    }

    /// Assistant turn, with any tool calls it made.
    pub fn assistant(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            tool_calls,
            tool_call_id: None,
        }
    }

    /// Result for the tool call `tool_call_id`.
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Tool,
            content: content.into(),
            tool_calls: vec![],
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    fn plain(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: vec![],
            tool_call_id: None,
        }
    }
}

// ============= Error Types =============

/// Library-level error.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The LLM provider failed or replied with something unusable.
    #[error("LLM error: {0}")]
    LLM(String),

    /// Weaviate is unreachable or rejected a query.
    #[error("Vector store error: {0}")]
    VectorStore(String),

    /// A tool, collection or record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad arguments or a malformed request.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unexpected failure inside the crate.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<crate::utils::toml_config::ConfigError> for AppError {
    fn from(err: crate::utils::toml_config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl AppError {
    /// The message without the category prefix `Display` adds.
    pub fn detail(&self) -> &str {
        match self {
            AppError::Config(m)
            | AppError::LLM(m)
            | AppError::VectorStore(m)
            | AppError::NotFound(m)
            | AppError::InvalidInput(m)
            | AppError::Internal(m) => m,
        }
    }
}

/// Result alias for library operations.
pub type Result<T> = std::result::Result<T, AppError>;
