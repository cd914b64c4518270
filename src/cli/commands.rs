//! Handlers for the `ask`, `tools`, `tickets` and `config` subcommands.

use super::output::Output;
use crate::agents::SupportAgent;
use crate::db::vectorstore::{ConnectionGuard, VectorStoreConnector};
use crate::db::weaviate::WeaviateConnector;
use crate::llm::OpenAIClient;
use crate::tools::ticket_search::TicketSearchTool;
use crate::tools::ToolRegistry;
use crate::types::{AppError, Result, ToolCall};
use crate::utils::toml_config::AppConfig;
use std::process::ExitCode;
use std::sync::Arc;

/// Run the agent on one request and print its answer.
pub async fn ask(config: &AppConfig, message: &str, show_tools: bool, output: &Output) -> Result<ExitCode> {
    let llm = OpenAIClient::from_config(&config.llm)?;
    let registry = Arc::new(ToolRegistry::with_config(config));
    let agent = SupportAgent::from_config(Arc::new(llm), registry, &config.llm);

    let response = agent.ask(message).await?;

    if show_tools && !response.tool_calls.is_empty() {
        output.header("Tool calls");
        for record in &response.tool_calls {
            let status = if record.success { "ok" } else { "failed" };
            output.list_item(&format!(
                "{} {} ({} ms, {})",
                record.name, record.arguments, record.duration_ms, status
            ));
            output.block(&record.result);
        }
        output.newline();
    }

    output.result(&response.content);
    Ok(ExitCode::SUCCESS)
}

/// `tools list`
pub fn list_tools(config: &AppConfig, output: &Output) -> Result<ExitCode> {
    let registry = ToolRegistry::with_config(config);
    output.header("Available tools");
    for definition in registry.list_tools() {
        output.tool_entry(&definition.name, &definition.description);
    }
    Ok(ExitCode::SUCCESS)
}

/// `tools show <name>`: description and parameter schema.
pub fn show_tool(config: &AppConfig, name: &str, output: &Output) -> Result<ExitCode> {
    let registry = ToolRegistry::with_config(config);
    let Some(tool) = registry.get_by_name(name) else {
        output.error(&format!("Unknown tool '{}'", name));
        output.hint(&format!("Available tools: {}", registry.tool_names().join(", ")));
        return Ok(ExitCode::FAILURE);
    };

    let definition = tool.describe();
    output.header(&definition.name);
    output.kv("description", &definition.description);
    output.kv("required", &definition.required_properties().join(", "));
    output.subheader("Parameters");
    let schema = serde_json::to_string_pretty(&definition.parameters)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    output.block(&schema);
    Ok(ExitCode::SUCCESS)
}

/// Run one tool directly. Prints the tool's output; failures exit non-zero.
pub async fn run_tool(config: &AppConfig, name: &str, args: &str, output: &Output) -> Result<ExitCode> {
    let arguments: serde_json::Value = serde_json::from_str(args)
        .map_err(|e| AppError::InvalidInput(format!("--args is not valid JSON: {}", e)))?;

    let registry = ToolRegistry::with_config(config);
    match registry.dispatch(&ToolCall::new(name, arguments)).await {
        Ok(text) => {
            output.result(&text);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            output.result(&e.to_string());
            Ok(ExitCode::FAILURE)
        }
    }
}

/// `tickets search`: one similar-ticket lookup, printed as the tool returns it.
pub async fn search_tickets(config: &AppConfig, query: &str, k: usize, output: &Output) -> Result<ExitCode> {
    let tool = TicketSearchTool::new(&config.vector_store);
    let text = tool.search_similar_tickets(query, k).await;
    let failed = text.starts_with("Error");
    output.result(&text);
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Connect, describe the collection, confirm the text field exists and run a test query.
pub async fn check_tickets(config: &AppConfig, output: &Output) -> Result<ExitCode> {
    let store = &config.vector_store;

    output.header("Vector store configuration");
    output.kv("URL", store.url.as_deref().unwrap_or("Not set"));
    output.kv(
        "API Key",
        if store.api_key().is_some() {
            "Set"
        } else {
            "Not set"
        },
    );
    output.kv("Class Name", &store.class_name);
    output.kv("Text Key", &store.text_key);

    if store.url.is_none() {
        output.error("WEAVIATE_URL is not set");
        output.hint("Set WEAVIATE_URL in .env or [vector_store].url in techsupport.toml");
        return Ok(ExitCode::FAILURE);
    }

    output.subheader("Testing connection");
    let connection = match WeaviateConnector::new().connect(store).await {
        Ok(connection) => connection,
        Err(e) => {
            output.error(&format!("Connection failed: {}", e));
            return Ok(ExitCode::FAILURE);
        }
    };
    let guard = ConnectionGuard::new(connection);
    output.success("Connected");

    let info = guard.connection().collection_info(&store.class_name).await;
    guard.release();

    let mut healthy = true;
    match info {
        Ok(info) => {
            output.kv("Collection", &info.name);
            output.kv("Vectorizer", info.vectorizer.as_deref().unwrap_or("none"));
            output.kv("Properties", &info.property_names().join(", "));
            if info.has_property(&store.text_key) {
                output.success(&format!("Text field '{}' found", store.text_key));
            } else {
                output.warning(&format!(
                    "Text field '{}' not found in collection '{}'",
                    store.text_key, info.name
                ));
                healthy = false;
            }
        }
        Err(e) => {
            output.error(&format!("Could not read collection schema: {}", e));
            return Ok(ExitCode::FAILURE);
        }
    }

    output.subheader("Testing search");
    let result = TicketSearchTool::new(store)
        .search_similar_tickets("test query", 1)
        .await;
    if result.starts_with("Error") {
        output.warning(&format!("Search test: {}", result));
        healthy = false;
    } else {
        output.success("Search functionality working");
    }

    Ok(if healthy {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Print the effective configuration, or only confirm it is valid.
pub fn show_config(config: &AppConfig, validate_only: bool, output: &Output) -> Result<ExitCode> {
    config.validate()?;
    if validate_only {
        output.success("Configuration is valid");
        return Ok(ExitCode::SUCCESS);
    }

    output.header("LLM");
    output.kv("model", &config.llm.model);
    output.kv("api_base", &config.llm.api_base);
    output.kv(
        &config.llm.api_key_env,
        if config.llm.api_key().is_ok() {
            "set"
        } else {
            "not set"
        },
    );
    output.kv("max_tool_iterations", &config.llm.max_tool_iterations.to_string());

    output.header("Vector store");
    output.kv("url", config.vector_store.url.as_deref().unwrap_or("not set"));
    output.kv("class_name", &config.vector_store.class_name);
    output.kv("text_key", &config.vector_store.text_key);
    output.kv("issue_field", &config.vector_store.issue_field);
    output.kv("solution_field", &config.vector_store.solution_field);

    output.header("Tools");
    output.kv("web_search.endpoint", &config.web_search.endpoint);
    output.kv("files.base_dir", &config.files.base_dir.display().to_string());

    Ok(ExitCode::SUCCESS)
}
