//! Configuration and logging setup.

/// Logging initialisation (tracing-subscriber).
pub mod logging;
/// Configuration loading (TOML, `.env`, environment overrides).
pub mod toml_config;
