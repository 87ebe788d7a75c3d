//! Replacer command-line host
//!
//! Drives the rule engine against requests saved on disk: copy values out of
//! one request into a rule, then use that rule on another request.

use clap::{Args as ClapArgs, Parser, Subcommand};
use replacer_engine::{ErrorCategory, ReplacerError};
use std::io::Write;
use std::path::PathBuf;

pub mod commands;
pub mod config;
pub mod logging;

use config::CliConfig;

/// Exit code for unreadable input or a command that does not fit the rules
pub const EXIT_INPUT: u8 = 2;
/// Exit code for everything else
pub const EXIT_FAILURE: u8 = 1;

#[derive(Parser, Debug, Clone)]
#[command(name = "replacer", author, version, about, long_about = None)]
pub struct Args {
    /// Log level (trace, debug, info, warn, error, off)
    #[arg(
        long,
        global = true,
        env = "REPLACER_LOG_LEVEL",
        default_value = "warn",
        value_parser = logging::levels::parse_level
    )]
    pub log_level: String,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Write rewritten requests with LF line endings
    #[arg(long, global = true)]
    pub lf: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Write a rule's stored values into a request
    Use(UseArgs),
    /// Read a request's values into a rule
    Copy(CopyArgs),
    /// List rules, or the menu actions a tool would offer
    List(ListArgs),
    /// Validate a rules file
    Check(CheckArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RulesArg {
    /// Rules document (JSON)
    #[arg(long, env = "REPLACER_RULES")]
    pub rules: PathBuf,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct UseArgs {
    #[command(flatten)]
    pub rules: RulesArg,

    /// Name of the rule to use
    #[arg(long)]
    pub rule: String,

    /// Raw HTTP request to rewrite
    #[arg(long)]
    pub request: PathBuf,

    /// Write the rewritten request here instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct CopyArgs {
    #[command(flatten)]
    pub rules: RulesArg,

    /// Name of the rule to fill
    #[arg(long)]
    pub rule: String,

    /// Raw HTTP request to read values from
    #[arg(long)]
    pub request: PathBuf,

    /// Save the updated rules back to the rules file instead of printing them
    #[arg(long)]
    pub write: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub rules: RulesArg,

    /// Show the menu labels offered in this tool (proxy, logger, target, repeater)
    #[arg(long)]
    pub tool: Option<replacer_engine::ToolSource>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub rules: RulesArg,
}

/// Run one command, writing its normal output to `out`
pub fn run<W: Write>(args: Args, out: &mut W) -> anyhow::Result<()> {
    let config = CliConfig::from_args(&args);
    match args.command {
        Command::Use(cmd) => commands::use_rule(&cmd, &config, out),
        Command::Copy(cmd) => commands::copy_rule(&cmd, out),
        Command::List(cmd) => commands::list_rules(&cmd, out),
        Command::Check(cmd) => commands::check_rules(&cmd, out),
    }
}

/// Process exit code for a failed command
pub fn exit_code(error: &anyhow::Error) -> u8 {
    match error.downcast_ref::<ReplacerError>().map(ReplacerError::category) {
        Some(ErrorCategory::Input) | Some(ErrorCategory::State) => EXIT_INPUT,
        _ => EXIT_FAILURE,
    }
}
