//! Tracing subscriber setup for the binary.
//!
//! Logs go to stderr so that tool output printed on stdout stays clean.
//! `RUST_LOG` takes precedence over the configured level.

use crate::utils::toml_config::{LogFormat, LoggingConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `verbose` raises the default level to `debug`.
pub fn init_tracing(config: &LoggingConfig, verbose: bool) {
    let default_level = if verbose {
        "debug"
    } else {
        config.level.as_str()
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);

    // try_init: a second call (e.g. from tests) keeps the first subscriber
    let result = match config.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    if let Err(e) = result {
        tracing::debug!("Tracing subscriber already installed: {}", e);
    }
}
