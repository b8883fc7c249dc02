//! pipeline-serializer: file-based mutual exclusion for data pipeline steps.
//!
//! This is the main entry point for the `pipeline-serializer` CLI. It parses
//! arguments, sets up logging, dispatches to the appropriate command handler,
//! and handles errors with proper exit codes.

mod cli;
mod commands;
pub mod config;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod locks;
pub mod logging;

#[cfg(test)]
mod test_support;

use clap::CommandFactory;
use cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    if let Err(err) = logging::init(&cli.log_options()) {
        eprintln!("Error: {}", err);
        return ExitCode::from(err.exit_code() as u8);
    }

    let Some(command) = cli.command else {
        // No subcommand: show help, like the host's own CLIs do.
        let _ = Cli::command().print_help();
        println!();
        return ExitCode::from(exit_codes::SUCCESS as u8);
    };

    match commands::dispatch(command) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            tracing::error!(exit_code = err.exit_code(), "{}", err);

            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            ExitCode::from(err.exit_code() as u8)
        }
    }
}
