//! Logging setup for the replacer binary
//!
//! Events go to stderr so rewritten requests on stdout stay clean.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration for the replacer binary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Whether to emit JSON formatted logs
    pub json_format: bool,

    /// Whether to include file and line number information
    pub include_file_info: bool,

    /// Whether to enable colored output (only for non-JSON format)
    pub enable_colors: bool,

    /// Module-specific log levels
    pub module_levels: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let mut module_levels = HashMap::new();
        module_levels.insert("replacer_engine".to_string(), "warn".to_string());

        Self {
            level: "warn".to_string(),
            json_format: false,
            include_file_info: false,
            enable_colors: true,
            module_levels,
        }
    }
}

impl LoggingConfig {
    /// Directive string handed to the env filter, e.g. `info,replacer_engine=debug`
    pub fn directives(&self) -> String {
        let mut modules: Vec<_> = self.module_levels.iter().collect();
        modules.sort();

        let mut directives = vec![self.level.clone()];
        directives.extend(
            modules
                .into_iter()
                .map(|(module, level)| format!("{}={}", module, level)),
        );
        directives.join(",")
    }
}

/// Initialize logging on stderr. `RUST_LOG`, when set, replaces the
/// configured directives. Calling this twice is harmless.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(&directives)
            .with_context(|| format!("Invalid RUST_LOG directive: {}", directives))?,
        _ => {
            let directives = config.directives();
            EnvFilter::try_new(&directives)
                .with_context(|| format!("Invalid log directive: {}", directives))?
        }
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json_format {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_file(config.include_file_info)
                    .with_line_number(config.include_file_info),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_file(config.include_file_info)
                    .with_line_number(config.include_file_info)
                    .with_ansi(config.enable_colors),
            )
            .try_init()
    };

    match result {
        Ok(_) => tracing::debug!("Logging initialized with level: {}", config.level),
        Err(_) => tracing::debug!("Logging already initialized, skipping"),
    }

    Ok(())
}

/// Log level utilities
pub mod levels {
    /// Check if a log level string is valid
    pub fn is_valid_level(level: &str) -> bool {
        matches!(
            level.to_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error" | "off"
        )
    }

    /// Get all valid log levels
    pub fn valid_levels() -> Vec<&'static str> {
        vec!["trace", "debug", "info", "warn", "error", "off"]
    }

    /// clap value parser for `--log-level`
    pub fn parse_level(level: &str) -> Result<String, String> {
        if is_valid_level(level) {
            Ok(level.to_lowercase())
        } else {
            Err(format!(
                "invalid log level '{}', expected one of: {}",
                level,
                valid_levels().join(", ")
            ))
        }
    }
}
