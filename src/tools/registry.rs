use crate::tools::file::FileTool;
use crate::tools::math::MathTool;
use crate::tools::ticket_search::TicketSearchTool;
use crate::tools::web_search::WebSearchTool;
use crate::types::{AppError, Result, ToolCall, ToolDefinition};
use crate::utils::toml_config::AppConfig;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

// ============= Tool Contract =============

/// Broad category of a tool failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or unusable configuration.
    Config,
    /// Arguments rejected before doing any work.
    InvalidInput,
    /// The thing the caller named is not there.
    NotFound,
    /// A remote service could not be reached or answered badly.
    Transport,
    /// The operation itself failed.
    Execution,
}

/// Typed tool failure. `Display` gives the exact text handed back to the model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    /// Required configuration is missing.
    #[error("Error: {0}")]
    Config(String),

    /// Arguments failed validation.
    #[error("Error: {0}")]
    InvalidInput(String),

    /// A file, tool or record does not exist.
    #[error("Error: {0}")]
    NotFound(String),

    /// A network or store call failed.
    #[error("Error {action}: {message}")]
    Transport {
        /// What was being attempted, e.g. `searching vector store`.
        action: &'static str,
        /// Underlying error text.
        message: String,
    },

    /// The tool ran and the operation failed.
    #[error("Error {action}: {message}")]
    Execution {
        /// What was being attempted, e.g. `reading file`.
        action: &'static str,
        /// Underlying error text.
        message: String,
    },
}

impl ToolError {
    /// Category of the failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ToolError::Config(_) => ErrorKind::Config,
            ToolError::InvalidInput(_) => ErrorKind::InvalidInput,
            ToolError::NotFound(_) => ErrorKind::NotFound,
            ToolError::Transport { .. } => ErrorKind::Transport,
            ToolError::Execution { .. } => ErrorKind::Execution,
        }
    }

    /// Transport failure while `action` was in progress.
    pub fn transport(action: &'static str, err: impl std::fmt::Display) -> Self {
        ToolError::Transport {
            action,
            message: err.to_string(),
        }
    }

    /// Rendered as `Error {action}: {err}`.
    pub fn execution(action: &'static str, err: impl std::fmt::Display) -> Self {
        ToolError::Execution {
            action,
            message: err.to_string(),
        }
    }
}

/// What a tool run produces before it is flattened to a string.
pub type ToolOutcome = std::result::Result<String, ToolError>;

/// A capability the model can call by name.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model calls this tool by.
    fn name(&self) -> &str;
    /// One-line summary shown to the model.
    fn description(&self) -> &str;
    /// JSON Schema for the arguments object.
    fn parameters_schema(&self) -> Value;

    /// Definition sent to the LLM in the `tools` list.
    fn describe(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }

    /// Check arguments before execution. The default only enforces `required`.
    fn validate(&self, args: &Value) -> bool {
        required_arguments_present(&self.parameters_schema(), args)
    }

    /// Runs the tool. Failures come back as `ToolError`, never a panic.
    async fn run(&self, args: Value) -> ToolOutcome;

    /// Run the tool and render the outcome. Never fails.
    async fn execute(&self, args: Value) -> String {
        match self.run(args).await {
            Ok(output) => output,
            Err(e) => e.to_string(),
        }
    }
}

/// `args` is an object and every name in the schema's `required` list maps to
/// a non-null value. Extra keys are ignored.
pub fn required_arguments_present(schema: &Value, args: &Value) -> bool {
    let Some(args) = args.as_object() else {
        return false;
    };

    schema
        .get("required")
        .and_then(|r| r.as_array())
        .map(|required| {
            required.iter().filter_map(|v| v.as_str()).all(|key| {
                args.get(key).map(|value| !value.is_null()).unwrap_or(false)
            })
        })
        .unwrap_or(true)
}

// ============= Tool Kinds =============

/// The fixed set of tools the assistant ships with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// `MathTool`
    Math,
    /// `WebSearchTool`
    WebSearch,
    /// `FileTool`
    File,
    /// `TicketSearchTool`
    TicketSearch,
}

impl ToolKind {
    /// Every kind, in registration order.
    pub const ALL: [ToolKind; 4] = [
        ToolKind::Math,
        ToolKind::WebSearch,
        ToolKind::File,
        ToolKind::TicketSearch,
    ];

    /// The name the tool is registered and called under.
    pub fn type_name(self) -> &'static str {
        match self {
            ToolKind::Math => MathTool::NAME,
            ToolKind::WebSearch => WebSearchTool::NAME,
            ToolKind::File => FileTool::NAME,
            ToolKind::TicketSearch => TicketSearchTool::NAME,
        }
    }

    /// Looks up a tool by its registered name. Matching is exact.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.type_name() == name)
    }

    /// Build a fresh instance configured from `config`.
    pub fn instantiate(self, config: &AppConfig) -> Arc<dyn Tool> {
        match self {
            ToolKind::Math => Arc::new(MathTool::new()),
            ToolKind::WebSearch => Arc::new(WebSearchTool::new(&config.web_search)),
            ToolKind::File => Arc::new(FileTool::new(&config.files)),
            ToolKind::TicketSearch => Arc::new(TicketSearchTool::new(&config.vector_store)),
        }
    }
}

// ============= Registry =============

/// Name-keyed set of tools the agent can call.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::with_config(&AppConfig::default())
    }
}

impl ToolRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Create a registry holding one instance of every [`ToolKind`].
    pub fn with_config(config: &AppConfig) -> Self {
        Self {
            tools: ToolKind::ALL
                .into_iter()
                .map(|kind| kind.instantiate(config))
                .collect(),
        }
    }

    /// Add a tool. Names must be unique.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        if self.has_tool(tool.name()) {
            return Err(AppError::InvalidInput(format!(
                "Tool '{}' is already registered",
                tool.name()
            )));
        }
        tracing::debug!(tool = %tool.name(), "Registered tool");
        self.tools.push(tool);
        Ok(())
    }

    /// Definitions of every registered tool, in registration order.
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|tool| tool.describe()).collect()
    }

    /// Handles to every registered tool, in registration order.
    pub fn instantiate_all(&self) -> Vec<Arc<dyn Tool>> {
        self.tools.clone()
    }

    /// Exact, case-sensitive lookup.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|tool| tool.name() == name).cloned()
    }

    /// Registered names, in registration order.
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|tool| tool.name().to_string()).collect()
    }

    /// Exact, case-sensitive.
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.iter().any(|tool| tool.name() == name)
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// True when no tool is registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Look up, validate and run a call, keeping the typed outcome.
    pub async fn dispatch(&self, call: &ToolCall) -> ToolOutcome {
        let tool = self
            .get_by_name(&call.name)
            .ok_or_else(|| ToolError::NotFound(format!("Unknown tool '{}'", call.name)))?;

        if !tool.validate(&call.arguments) {
            tracing::warn!(tool = %call.name, args = %call.arguments, "Rejected tool arguments");
            return Err(ToolError::InvalidInput(format!(
                "Invalid arguments for tool '{}'",
                call.name
            )));
        }

        let started = Instant::now();
        tracing::info!(tool = %call.name, call_id = %call.id, "Invoking tool");
        let outcome = tool.run(call.arguments.clone()).await;
        tracing::debug!(
            tool = %call.name,
            elapsed_ms = started.elapsed().as_millis() as u64,
            ok = outcome.is_ok(),
            "Tool finished"
        );
        outcome
    }

    /// Run a call and flatten the outcome to the string the model sees.
    pub async fn invoke(&self, call: &ToolCall) -> String {
        match self.dispatch(call).await {
            Ok(output) => output,
            Err(e) => e.to_string(),
        }
    }
}
