//! Plain file access for the agent: read, write, list and existence checks.
//!
//! Relative paths are resolved against the configured base directory. Messages
//! echo the path exactly as the caller wrote it.

use crate::tools::registry::{required_arguments_present, Tool, ToolError, ToolOutcome};
use crate::utils::toml_config::FileToolConfig;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

const OPERATIONS: [&str; 4] = ["read", "write", "list", "exists"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileType {
    Text,
    Json,
}

impl FileType {
    fn from_arg(value: Option<&str>) -> Self {
        match value {
            Some("json") => FileType::Json,
            _ => FileType::Text,
        }
    }
}

/// Reads and writes text or JSON files and lists directories.
pub struct FileTool {
    base_dir: PathBuf,
}

impl FileTool {
    /// Registered tool name.
    pub const NAME: &'static str = "FileTool";

    /// Resolves relative paths against `config.base_dir`.
    pub fn new(config: &FileToolConfig) -> Self {
        Self {
            base_dir: config.base_dir.clone(),
        }
    }

    fn resolve_path(&self, path: &str) -> PathBuf {
        let path = PathBuf::from(path);
        if path.is_absolute() {
            path
        } else {
            self.base_dir.join(path)
        }
    }

    async fn read_file(&self, path: &str, file_type: FileType) -> ToolOutcome {
        let full_path = self.resolve_path(path);
        if !exists(&full_path).await {
            return Err(ToolError::NotFound(format!("File '{}' does not exist", path)));
        }

        let content = tokio::fs::read_to_string(&full_path)
            .await
            .map_err(|e| ToolError::execution("reading file", e))?;

        if file_type == FileType::Json {
            return Ok(match serde_json::from_str::<Value>(&content) {
                Ok(data) => {
                    let pretty = serde_json::to_string_pretty(&data)
                        .map_err(|e| ToolError::execution("reading file", e))?;
                    format!("JSON content:\n{}", pretty)
                }
                Err(_) => format!("File content (not valid JSON):\n{}", content),
            });
        }

        Ok(format!("File content:\n{}", content))
    }

    async fn write_file(&self, path: &str, content: &str, file_type: FileType) -> ToolOutcome {
        // Validate before touching the filesystem
        let payload = match file_type {
            FileType::Json => {
                let data = serde_json::from_str::<Value>(content).map_err(|_| {
                    ToolError::InvalidInput("Content is not valid JSON".to_string())
                })?;
                serde_json::to_string_pretty(&data)
                    .map_err(|e| ToolError::execution("writing file", e))?
            }
            FileType::Text => content.to_string(),
        };

        let full_path = self.resolve_path(path);
        if let Some(parent) = full_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ToolError::execution("writing file", e))?;
        }

        tokio::fs::write(&full_path, payload)
            .await
            .map_err(|e| ToolError::execution("writing file", e))?;

        tracing::debug!(path = %full_path.display(), "Wrote file");
        Ok(format!("Successfully wrote to '{}'", path))
    }

    async fn list_directory(&self, path: &str) -> ToolOutcome {
        let full_path = self.resolve_path(path);
        let metadata = match tokio::fs::metadata(&full_path).await {
            Ok(m) => m,
            Err(e) if e.kind() == IoErrorKind::NotFound => {
                return Err(ToolError::NotFound(format!(
                    "Directory '{}' does not exist",
                    path
                )))
            }
            Err(e) => return Err(ToolError::execution("listing directory", e)),
        };
        if !metadata.is_dir() {
            return Err(ToolError::InvalidInput(format!(
                "'{}' is not a directory",
                path
            )));
        }

        let mut entries = Vec::new();
        let mut dir = tokio::fs::read_dir(&full_path)
            .await
            .map_err(|e| ToolError::execution("listing directory", e))?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| ToolError::execution("listing directory", e))?
        {
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            entries.push((entry.file_name().to_string_lossy().into_owned(), is_dir));
        }

        if entries.is_empty() {
            return Ok(format!("Directory '{}' is empty", path));
        }

        entries.sort();
        let mut listing = format!("Contents of '{}':\n", path);
        for (name, is_dir) in entries {
            if is_dir {
                listing.push_str(&format!("📁 {}/\n", name));
            } else {
                listing.push_str(&format!("📄 {}\n", name));
            }
        }
        Ok(listing)
    }

    async fn check_exists(&self, path: &str) -> ToolOutcome {
        let full_path = self.resolve_path(path);
        Ok(match tokio::fs::metadata(&full_path).await {
            Ok(m) if m.is_dir() => format!("Directory '{}' exists", path),
            Ok(_) => format!("File '{}' exists", path),
            Err(_) => format!("'{}' does not exist", path),
        })
    }
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

fn content_arg(args: &Value) -> Option<String> {
    match args.get("content") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

#[async_trait]
impl Tool for FileTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Read and write files. Supports text files, JSON files, and basic file operations like listing directories."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "operation": {
                    "type": "string",
                    "description": "The operation to perform: 'read', 'write', 'list', 'exists'",
                    "enum": OPERATIONS
                },
                "file_path": {
                    "type": "string",
                    "description": "The path to the file or directory"
                },
                "content": {
                    "type": "string",
                    "description": "Content to write to the file (for write operations)"
                },
                "file_type": {
                    "type": "string",
                    "description": "Type of file: 'text' or 'json' (default: 'text')",
                    "default": "text"
                }
            },
            "required": ["operation", "file_path"]
        })
    }

    fn validate(&self, args: &Value) -> bool {
        if !required_arguments_present(&self.parameters_schema(), args) {
            return false;
        }
        match args["operation"].as_str() {
            Some("write") => content_arg(args).is_some(),
            Some(op) => OPERATIONS.contains(&op),
            None => false,
        }
    }

    async fn run(&self, args: Value) -> ToolOutcome {
        let operation = args["operation"].as_str().unwrap_or_default();
        let path = args["file_path"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidInput("file_path must be a string".to_string()))?;
        let file_type = FileType::from_arg(args["file_type"].as_str());

        tracing::debug!(operation = %operation, path = %path, "File operation");

        match operation {
            "read" => self.read_file(path, file_type).await,
            "write" => {
                let content = content_arg(&args).ok_or_else(|| {
                    ToolError::InvalidInput("Content is required for write operations".to_string())
                })?;
                self.write_file(path, &content, file_type).await
            }
            "list" => self.list_directory(path).await,
            "exists" => self.check_exists(path).await,
            other => Err(ToolError::InvalidInput(format!(
                "Unknown operation '{}'",
                other
            ))),
        }
    }
}
