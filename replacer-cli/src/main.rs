//! Replacer Binary Entry Point

use clap::Parser;
use replacer_cli::{config::CliConfig, exit_code, logging, run, Args};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();

    let config = CliConfig::from_args(&args);
    if let Err(e) = logging::init_logging(&config.logging) {
        eprintln!("Failed to initialize logging: {:#}", e);
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match run(args, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("Command failed: {:?}", e);
            eprintln!("error: {:#}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}
