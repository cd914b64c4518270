//! CLI Integration Tests for techsupport-agent
//!
//! Tests the command-line interface: help output, the init command, the
//! config command and running tools directly. Nothing here needs an LLM key
//! or a vector store.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// The binary, run inside `dir` with no inherited service settings.
fn techsupport(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("techsupport-agent").unwrap();
    cmd.current_dir(dir.path())
        .arg("--no-color")
        .env_remove("WEAVIATE_URL")
        .env_remove("WEAVIATE_API_KEY")
        .env_remove("WEAVIATE_CLASS_NAME")
        .env_remove("WEAVIATE_TEXT_KEY")
        .env_remove("OPENAI_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_command() {
    let dir = TempDir::new().unwrap();
    techsupport(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("tools"))
        .stdout(predicate::str::contains("tickets"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn test_version_command() {
    let dir = TempDir::new().unwrap();
    techsupport(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("techsupport-agent"));
}

#[test]
fn test_unknown_subcommand() {
    let dir = TempDir::new().unwrap();
    techsupport(&dir).arg("frobnicate").assert().failure();
}

// =============================================================================
// Tools Tests
// =============================================================================

#[test]
fn test_tools_list() {
    let dir = TempDir::new().unwrap();
    techsupport(&dir)
        .args(["tools", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MathTool"))
        .stdout(predicate::str::contains("WebSearchTool"))
        .stdout(predicate::str::contains("FileTool"))
        .stdout(predicate::str::contains("TicketSearchTool"));
}

#[test]
fn test_tools_show() {
    let dir = TempDir::new().unwrap();
    techsupport(&dir)
        .args(["tools", "show", "FileTool"])
        .assert()
        .success()
        .stdout(predicate::str::contains("operation"))
        .stdout(predicate::str::contains("file_path"));
}

#[test]
fn test_tools_show_unknown() {
    let dir = TempDir::new().unwrap();
    techsupport(&dir)
        .args(["tools", "show", "ShellTool"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown tool 'ShellTool'"));
}

#[test]
fn test_tools_run_math() {
    let dir = TempDir::new().unwrap();
    techsupport(&dir)
        .args(["tools", "run", "MathTool", "--args", r#"{"expression": "2 + 2"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("Result: 4"));
}

#[test]
fn test_tools_run_reports_tool_error() {
    let dir = TempDir::new().unwrap();
    techsupport(&dir)
        .args(["tools", "run", "MathTool", "--args", r#"{"expression": "open('x')"}"#])
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "Error: Expression contains unsafe operations",
        ));
}

#[test]
fn test_tools_run_file_write() {
    let dir = TempDir::new().unwrap();
    techsupport(&dir)
        .args([
            "tools",
            "run",
            "FileTool",
            "--args",
            r#"{"operation": "write", "file_path": "out.txt", "content": "hello"}"#,
        ])
        .assert()
        .success();

    assert_eq!(fs::read_to_string(dir.path().join("out.txt")).unwrap(), "hello");
}

#[test]
fn test_tickets_search_without_store() {
    let dir = TempDir::new().unwrap();
    techsupport(&dir)
        .args(["tickets", "search", "printer jam"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("WEAVIATE_URL"));
}

// =============================================================================
// Init and Config Tests
// =============================================================================

#[test]
fn test_init_creates_files() {
    let dir = TempDir::new().unwrap();
    techsupport(&dir).arg("init").assert().success();

    let config = fs::read_to_string(dir.path().join("techsupport.toml")).unwrap();
    assert!(config.contains("[llm]"));
    assert!(config.contains("[vector_store]"));
    assert!(dir.path().join(".env.example").exists());
}

#[test]
fn test_init_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("techsupport.toml"), "# mine\n").unwrap();

    techsupport(&dir).arg("init").assert().failure();
    assert_eq!(
        fs::read_to_string(dir.path().join("techsupport.toml")).unwrap(),
        "# mine\n"
    );

    techsupport(&dir).args(["init", "--force"]).assert().success();
}

#[test]
fn test_init_reports_kept_env_example() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".env.example"), "OPENAI_API_KEY=mine\n").unwrap();

    techsupport(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("[SKIPPED] env .env.example"))
        .stdout(predicate::str::contains("[CREATED] env").not());
    assert_eq!(
        fs::read_to_string(dir.path().join(".env.example")).unwrap(),
        "OPENAI_API_KEY=mine\n"
    );
}

#[test]
fn test_init_then_validate() {
    let dir = TempDir::new().unwrap();
    techsupport(&dir).arg("init").assert().success();
    techsupport(&dir)
        .args(["config", "--validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn test_config_shows_defaults() {
    let dir = TempDir::new().unwrap();
    techsupport(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("TechSupport"))
        .stdout(predicate::str::contains("originalMessage"));
}

#[test]
fn test_invalid_config_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("techsupport.toml"),
        "[llm]\nmax_tool_iterations = 0\n",
    )
    .unwrap();

    techsupport(&dir).args(["config", "--validate"]).assert().failure();
}

#[test]
fn test_missing_explicit_config_file() {
    let dir = TempDir::new().unwrap();
    techsupport(&dir)
        .args(["--config", "nope.toml", "tools", "list"])
        .assert()
        .failure();
}
