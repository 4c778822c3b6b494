//! # Structured Logging
//!
//! Subscriber setup using `tracing-subscriber`. The filter honors
//! `RUST_LOG` when set, falling back to the configured level.

use tracing_subscriber::{fmt, EnvFilter};

use crate::errors::{Error, Result};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default level directive, e.g. `info` or `edgekit=debug`
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

impl LoggingConfig {
    /// Read `EDGEKIT_LOG_LEVEL` and `EDGEKIT_LOG_FORMAT` from the
    /// environment, defaulting to `info` text output.
    pub fn from_env() -> Self {
        let level =
            std::env::var("EDGEKIT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let json = std::env::var("EDGEKIT_LOG_FORMAT")
            .map(|format| format.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        Self { level, json }
    }
}

/// Install the global tracing subscriber.
///
/// Fails when a subscriber is already set, so call it once at process
/// startup.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| Error::config(format!("Invalid log filter '{}': {}", config.level, e)))?;

    let builder = fmt().with_env_filter(filter).with_target(true);

    let install_result = if config.json {
        builder.json().flatten_event(true).try_init()
    } else {
        builder.try_init()
    };

    install_result
        .map_err(|e| Error::config(format!("Failed to initialize logging: {}", e)))?;

    tracing::debug!(level = %config.level, json = config.json, "Logging initialized");
    Ok(())
}
