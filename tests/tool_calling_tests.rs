//! Integration tests for tool calling functionality
//!
//! These tests drive the registry the way the agent does:
//! - Tool definitions handed to the model
//! - Dispatch by name with JSON arguments
//! - Error strings for unknown tools, bad arguments and failing tools

use serde_json::json;
use std::sync::Arc;
use techsupport::tools::math::MathTool;
use techsupport::tools::registry::ErrorKind;
use techsupport::tools::{Tool, ToolKind, ToolRegistry};
use techsupport::types::ToolCall;
use techsupport::AppConfig;
use tempfile::TempDir;

fn registry_in(dir: &TempDir) -> ToolRegistry {
    let mut config = AppConfig::default();
    config.files.base_dir = dir.path().to_path_buf();
    ToolRegistry::with_config(&config)
}

#[test]
fn test_registry_holds_every_kind() {
    let registry = ToolRegistry::default();
    assert_eq!(registry.len(), ToolKind::ALL.len());
    assert_eq!(
        registry.tool_names(),
        vec!["MathTool", "WebSearchTool", "FileTool", "TicketSearchTool"]
    );
}

#[test]
fn test_tool_definitions_schema() {
    let registry = ToolRegistry::default();

    for def in registry.list_tools() {
        assert!(!def.name.is_empty(), "Tool name should not be empty");
        assert!(!def.description.is_empty(), "{} has no description", def.name);
        assert_eq!(def.parameters["type"], "object");

        let properties = def.property_names();
        for required in def.required_properties() {
            assert!(
                properties.contains(&required),
                "{} requires undeclared '{}'",
                def.name,
                required
            );
        }
    }
}

#[test]
fn test_instantiate_all_matches_definitions() {
    let registry = ToolRegistry::default();
    let names: Vec<String> = registry
        .instantiate_all()
        .iter()
        .map(|tool| tool.name().to_string())
        .collect();
    assert_eq!(names, registry.tool_names());
}

#[test]
fn test_lookup_is_exact() {
    let registry = ToolRegistry::default();
    assert!(registry.get_by_name("MathTool").is_some());
    assert!(registry.get_by_name("mathtool").is_none());
    assert!(registry.get_by_name("NoSuchTool").is_none());
}

#[test]
fn test_duplicate_registration_rejected() {
    let mut registry = ToolRegistry::default();
    assert!(registry.register(Arc::new(MathTool::new())).is_err());
    assert_eq!(registry.len(), 4);
}

#[tokio::test]
async fn test_math_tool_execution() {
    let registry = ToolRegistry::default();

    let sum = ToolCall::new("MathTool", json!({"expression": "2 + 2"}));
    assert_eq!(registry.invoke(&sum).await, "Result: 4");

    let root = ToolCall::new("MathTool", json!({"expression": "sqrt(16)"}));
    assert_eq!(registry.invoke(&root).await, "Result: 4.0");

    let mixed = ToolCall::new("MathTool", json!({"expression": "15 + 27 * 2 - (3 ** 2)"}));
    assert_eq!(registry.invoke(&mixed).await, "Result: 60");
}

#[tokio::test]
async fn test_math_tool_rejects_unsafe_input() {
    let registry = ToolRegistry::default();
    let call = ToolCall::new("MathTool", json!({"expression": "__import__('os')"}));

    let err = registry.dispatch(&call).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(err.to_string(), "Error: Expression contains unsafe operations");
}

#[tokio::test]
async fn test_math_tool_reports_evaluation_errors() {
    let registry = ToolRegistry::default();
    let call = ToolCall::new("MathTool", json!({"expression": "1 / 0"}));

    let out = registry.invoke(&call).await;
    assert!(out.starts_with("Error evaluating expression:"), "{}", out);
}

#[tokio::test]
async fn test_math_tool_survives_extreme_input() {
    let registry = ToolRegistry::default();

    let min_floor_div = ToolCall::new(
        "MathTool",
        json!({"expression": "(-9223372036854775807 - 1) // -1"}),
    );
    assert_eq!(
        registry.invoke(&min_floor_div).await,
        "Result: 9.223372036854776e+18"
    );

    let nested = format!("{}1{}", "(".repeat(200_000), ")".repeat(200_000));
    let deep = ToolCall::new("MathTool", json!({"expression": nested}));
    assert_eq!(
        registry.invoke(&deep).await,
        "Error evaluating expression: expression is nested too deeply"
    );
}

#[tokio::test]
async fn test_unknown_tool() {
    let registry = ToolRegistry::default();
    let call = ToolCall::new("ShellTool", json!({"cmd": "ls"}));

    let err = registry.dispatch(&call).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.to_string(), "Error: Unknown tool 'ShellTool'");
}

#[tokio::test]
async fn test_missing_required_argument() {
    let registry = ToolRegistry::default();
    let call = ToolCall::new("WebSearchTool", json!({"max_results": 3}));

    assert_eq!(
        registry.invoke(&call).await,
        "Error: Invalid arguments for tool 'WebSearchTool'"
    );
}

#[tokio::test]
async fn test_file_round_trip_through_registry() {
    let dir = TempDir::new().unwrap();
    let registry = registry_in(&dir);

    let write = ToolCall::new(
        "FileTool",
        json!({
            "operation": "write",
            "file_path": "notes/ticket.json",
            "content": "{\"printer\": \"jammed\"}",
            "file_type": "json"
        }),
    );
    assert_eq!(
        registry.invoke(&write).await,
        "Successfully wrote to 'notes/ticket.json'"
    );

    let read = ToolCall::new(
        "FileTool",
        json!({"operation": "read", "file_path": "notes/ticket.json", "file_type": "json"}),
    );
    let out = registry.invoke(&read).await;
    assert!(out.starts_with("JSON content:\n"));
    assert!(out.contains("\"printer\": \"jammed\""));

    let list = ToolCall::new("FileTool", json!({"operation": "list", "file_path": "."}));
    assert!(registry.invoke(&list).await.contains("📁 notes/"));
}

#[tokio::test]
async fn test_file_write_without_content_is_rejected() {
    let dir = TempDir::new().unwrap();
    let registry = registry_in(&dir);

    let call = ToolCall::new("FileTool", json!({"operation": "write", "file_path": "a.txt"}));
    let err = registry.dispatch(&call).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(!dir.path().join("a.txt").exists());
}

#[tokio::test]
async fn test_ticket_search_without_store_reports_configuration() {
    let registry = ToolRegistry::default();
    let call = ToolCall::new("TicketSearchTool", json!({"query": "vpn drops every hour"}));

    let err = registry.dispatch(&call).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}
