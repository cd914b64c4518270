//! TOML-based configuration for the tech-support agent
//!
//! Configuration is resolved once at startup: an optional `techsupport.toml`
//! is parsed, `.env` is loaded, and a small set of environment variables
//! override individual fields. Credentials are only referenced by env var name
//! here and are resolved lazily when a tool or client first needs them.
//!
//! # Recognized environment variables
//!
//! | Variable | Field |
//! |----------|-------|
//! | `WEAVIATE_URL` | `vector_store.url` |
//! | `WEAVIATE_CLASS_NAME` | `vector_store.class_name` (trimmed) |
//! | `WEAVIATE_TEXT_KEY` | `vector_store.text_key` |
//! | `OPENAI_MODEL` | `llm.model` |
//! | `OPENAI_API_BASE` | `llm.api_base` |
//!
//! API keys are read from the variables named by `llm.api_key_env`
//! (default `OPENAI_API_KEY`) and `vector_store.api_key_env`
//! (default `WEAVIATE_API_KEY`).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_FILE: &str = "techsupport.toml";

/// Root configuration structure loaded from techsupport.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// `[llm]`
    #[serde(default)]
    pub llm: LlmConfig,

    /// `[vector_store]`
    #[serde(default)]
    pub vector_store: VectorStoreConfig,

    /// `[web_search]`
    #[serde(default)]
    pub web_search: WebSearchConfig,

    /// `[files]`
    #[serde(default)]
    pub files: FileToolConfig,

    /// `[logging]`
    #[serde(default)]
    pub logging: LoggingConfig,
}

// ============= LLM Configuration =============

/// LLM provider settings (`[llm]`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmConfig {
    /// Environment variable containing the API key
    #[serde(default = "default_openai_key_env")]
    pub api_key_env: String,

    /// Base URL of the chat completions API
    #[serde(default = "default_openai_base")]
    pub api_base: String,

    /// Model id, e.g. `gpt-4`
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    /// Maximum tool calling iterations per request
    #[serde(default = "default_max_tool_iterations")]
    pub max_tool_iterations: usize,

    /// Overrides the built-in support prompt
    #[serde(default)]
    pub system_prompt: Option<String>,
}

fn default_openai_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_openai_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_llm_timeout() -> u64 {
    60
}

fn default_max_tool_iterations() -> usize {
    10
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_openai_key_env(),
            api_base: default_openai_base(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_llm_timeout(),
            max_tool_iterations: default_max_tool_iterations(),
            system_prompt: None,
        }
    }
}

impl LlmConfig {
    /// Resolve the API key from the environment.
    pub fn api_key(&self) -> Result<String, ConfigError> {
        resolve_env(&self.api_key_env)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(self.api_key_env.clone()))
    }
}

// ============= Vector Store Configuration =============

/// Weaviate settings (`[vector_store]`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorStoreConfig {
    /// Weaviate endpoint; the ticket search tool reports an error when unset
    #[serde(default)]
    pub url: Option<String>,

    /// Environment variable for the Weaviate API key
    #[serde(default = "default_weaviate_key_env")]
    pub api_key_env: String,

    /// Collection (class) holding past tickets
    #[serde(default = "default_class_name")]
    pub class_name: String,

    /// Main text property of the collection, checked by `tickets check`
    #[serde(default = "default_text_key")]
    pub text_key: String,

    /// Property holding the original issue text
    #[serde(default = "default_issue_field")]
    pub issue_field: String,

    /// Property holding the aggregated replies
    #[serde(default = "default_solution_field")]
    pub solution_field: String,

    /// Request timeout in seconds
    #[serde(default = "default_network_timeout")]
    pub timeout_secs: u64,
}

fn default_weaviate_key_env() -> String {
    "WEAVIATE_API_KEY".to_string()
}

fn default_class_name() -> String {
    "TechSupport".to_string()
}

fn default_text_key() -> String {
    "text".to_string()
}

fn default_issue_field() -> String {
    "originalMessage".to_string()
}

fn default_solution_field() -> String {
    "repliesAggregated".to_string()
}

fn default_network_timeout() -> u64 {
    10
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key_env: default_weaviate_key_env(),
            class_name: default_class_name(),
            text_key: default_text_key(),
            issue_field: default_issue_field(),
            solution_field: default_solution_field(),
            timeout_secs: default_network_timeout(),
        }
    }
}

impl VectorStoreConfig {
    /// Config pointing at a specific endpoint, everything else default.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// API key if the configured variable is set. Anonymous access otherwise.
    pub fn api_key(&self) -> Option<String> {
        resolve_env(&self.api_key_env).filter(|k| !k.is_empty())
    }
}

// ============= Web Search Configuration =============

/// DuckDuckGo instant-answer settings (`[web_search]`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebSearchConfig {
    /// DuckDuckGo API endpoint
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_network_timeout")]
    pub timeout_secs: u64,

    /// Result count when the call does not pass `max_results`
    #[serde(default = "default_max_results")]
    pub default_max_results: u64,
}

fn default_search_endpoint() -> String {
    "https://api.duckduckgo.com/".to_string()
}

fn default_max_results() -> u64 {
    3
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            timeout_secs: default_network_timeout(),
            default_max_results: default_max_results(),
        }
    }
}

// ============= File Tool Configuration =============

/// File tool settings (`[files]`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileToolConfig {
    /// Directory relative paths are resolved against
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for FileToolConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
        }
    }
}

// ============= Logging Configuration =============

/// Log line format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, for terminals.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging settings (`[logging]`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty` or `json`
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An explicitly requested file does not exist.
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O failure reading the file.
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// The file is not valid TOML or has the wrong shape.
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Writing the default template failed.
    #[error("Failed to serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// A value is out of range or inconsistent.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A `${VAR}` reference names an unset variable.
    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),
}

impl AppConfig {
    /// Load configuration for the binary.
    ///
    /// `.env` is read first. An explicitly requested file must exist; the
    /// default file is optional and built-in defaults apply without it.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => {
                debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                Self::default()
            }
        };

        config.apply_env_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file without applying environment overrides.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Render as TOML, used by `init` to write a template.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply environment overrides using the given lookup.
    ///
    /// The lookup is injectable so tests do not have to mutate the process env.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("WEAVIATE_URL").filter(|v| !v.trim().is_empty()) {
            self.vector_store.url = Some(url.trim().to_string());
        }
        if let Some(class_name) = lookup("WEAVIATE_CLASS_NAME").filter(|v| !v.trim().is_empty()) {
            self.vector_store.class_name = class_name.trim().to_string();
        }
        if let Some(text_key) = lookup("WEAVIATE_TEXT_KEY").filter(|v| !v.trim().is_empty()) {
            self.vector_store.text_key = text_key.trim().to_string();
        }
        if let Some(model) = lookup("OPENAI_MODEL").filter(|v| !v.is_empty()) {
            self.llm.model = model;
        }
        if let Some(base) = lookup("OPENAI_API_BASE").filter(|v| !v.is_empty()) {
            self.llm.api_base = base;
        }
    }

    /// Structural validation. Credentials and endpoints are checked at first use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::ValidationError("llm.model must not be empty".into()));
        }
        if self.llm.max_tool_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "llm.max_tool_iterations must be at least 1".into(),
            ));
        }

        for (field, secs) in [
            ("llm.timeout_secs", self.llm.timeout_secs),
            ("vector_store.timeout_secs", self.vector_store.timeout_secs),
            ("web_search.timeout_secs", self.web_search.timeout_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be greater than zero",
                    field
                )));
            }
        }

        for (field, value) in [
            ("vector_store.class_name", &self.vector_store.class_name),
            ("vector_store.text_key", &self.vector_store.text_key),
            ("vector_store.issue_field", &self.vector_store.issue_field),
            ("vector_store.solution_field", &self.vector_store.solution_field),
        ] {
            if !is_identifier(value) {
                return Err(ConfigError::ValidationError(format!(
                    "{} '{}' is not a valid identifier",
                    field, value
                )));
            }
        }

        Ok(())
    }
}

/// Get a value from the environment by variable name
pub fn resolve_env(env_name: &str) -> Option<String> {
    std::env::var(env_name).ok()
}

/// GraphQL-style name: a letter or underscore followed by letters, digits or underscores.
pub fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
