//! Runtime configuration for the replacer binary

use crate::logging::LoggingConfig;
use crate::Args;
use serde::{Deserialize, Serialize};

/// Settings resolved once at startup from the command line and environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Logging setup
    pub logging: LoggingConfig,
    /// Emit rewritten requests with bare LF line endings instead of CRLF
    pub lf_output: bool,
}

impl CliConfig {
    pub fn from_args(args: &Args) -> Self {
        let mut config = Self::default();
        config.logging.level = args.log_level.clone();
        config.logging.json_format = args.json_logs;
        config.logging.enable_colors = !args.json_logs;
        config
            .logging
            .module_levels
            .insert("replacer_engine".to_string(), args.log_level.clone());
        config.lf_output = args.lf;
        config
    }
}
