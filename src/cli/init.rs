//! Init command implementation
//!
//! Writes a starter `techsupport.toml` and `.env.example`.

use super::output::Output;
use crate::utils::toml_config::{AppConfig, DEFAULT_CONFIG_FILE};
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the init operation
#[derive(Debug, PartialEq, Eq)]
pub enum InitResult {
    /// Initialization completed successfully
    Success,
    /// A config file is already there and `--force` was not given
    AlreadyExists,
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: PathBuf,
    /// Overwrite existing files
    pub force: bool,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.header("Initializing tech-support agent configuration");

    let base_path = &config.path;
    let config_path = base_path.join(DEFAULT_CONFIG_FILE);
    if config_path.exists() && !config.force {
        output.warning(&format!("{} already exists!", DEFAULT_CONFIG_FILE));
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    if !base_path.exists() {
        if let Err(e) = fs::create_dir_all(base_path) {
            output.error(&format!("Failed to create {}: {}", base_path.display(), e));
            return InitResult::Error(e.to_string());
        }
        output.created_dir(&base_path.display().to_string());
    }

    let toml_content = match generate_config_toml() {
        Ok(content) => content,
        Err(e) => {
            output.error(&format!("Failed to render configuration: {}", e));
            return InitResult::Error(e);
        }
    };
    match write_file(&config_path, &toml_content, config.force) {
        Ok(true) => output.created("config", DEFAULT_CONFIG_FILE),
        Ok(false) => output.skipped("config", DEFAULT_CONFIG_FILE),
        Err(e) => {
            output.error(&format!("Failed to create {}: {}", DEFAULT_CONFIG_FILE, e));
            return InitResult::Error(e.to_string());
        }
    }

    let env_example_path = base_path.join(".env.example");
    match write_file(&env_example_path, &generate_env_example(), config.force) {
        Ok(true) => output.created("env", ".env.example"),
        Ok(false) => output.skipped("env", ".env.example"),
        Err(e) => {
            output.error(&format!("Failed to create .env.example: {}", e));
            return InitResult::Error(e.to_string());
        }
    }

    output.complete("Configuration initialized");

    output.header("Next Steps");
    output.newline();
    output.info("1. Set up environment variables:");
    output.command("cp .env.example .env");
    output.command("# Edit .env and set OPENAI_API_KEY (and WEAVIATE_URL for ticket search)");
    output.newline();
    output.info("2. Check the setup:");
    output.command("techsupport-agent config --validate");
    output.command("techsupport-agent tickets check");
    output.newline();
    output.info("3. Ask something:");
    output.command("techsupport-agent ask \"What is 15 + 27?\"");

    InitResult::Success
}

/// Returns false when an existing file was left alone.
fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    fs::write(path, content)?;
    Ok(true)
}

fn generate_config_toml() -> Result<String, String> {
    let body = AppConfig::default().to_toml().map_err(|e| e.to_string())?;
    Ok(format!(
        "# Tech-support agent configuration\n\
         # Environment variables (WEAVIATE_URL, OPENAI_MODEL, ...) override these values.\n\n{}",
        body
    ))
}

fn generate_env_example() -> String {
    r#"# Tech-support agent environment variables
# Copy this file to .env and fill in the values.

# REQUIRED for `ask`: OpenAI API key
OPENAI_API_KEY=sk-...

# Optional: override the model or point at a compatible endpoint
# OPENAI_MODEL=gpt-4o
# OPENAI_API_BASE=https://api.openai.com/v1

# Optional: Weaviate instance holding past support tickets
# WEAVIATE_URL=https://your-cluster.weaviate.network
# WEAVIATE_API_KEY=your-key
# WEAVIATE_CLASS_NAME=TechSupport
# WEAVIATE_TEXT_KEY=text

# Optional: Logging level (trace, debug, info, warn, error)
# RUST_LOG=techsupport=debug
"#
    .to_string()
}
