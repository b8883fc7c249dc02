//! CLI argument parsing for pipeline-serializer.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use crate::config::LockOverrides;
use crate::logging::LogOptions;
use clap::builder::FalseyValueParser;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Serialize steps in a data pipeline with a file-based lock.
///
/// `lock` blocks until the lock file can be created (or a stale one left by a
/// dead process is reclaimed); `unlock` removes it. Steps wrapped between the
/// two run one at a time across independent processes.
#[derive(Parser, Debug)]
#[command(name = "pipeline-serializer")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log level (trace, debug, info, warning, error).
    #[arg(long, env = "LOG_LEVEL", default_value = "INFO", global = true)]
    pub log_level: String,

    /// Show timestamps in logs.
    #[arg(long, env = "LOG_TIMESTAMPS", global = true, value_parser = FalseyValueParser::new())]
    pub log_timestamps: bool,

    /// Show log levels.
    #[arg(long, env = "LOG_LEVELS", global = true, value_parser = FalseyValueParser::new())]
    pub log_levels: bool,

    /// Log in the JSON log format expected by the orchestration host.
    #[arg(long, env = "MELTANO_LOG_JSON", global = true, value_parser = FalseyValueParser::new())]
    pub meltano_log_json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Acquire a lock to serialize around.
    ///
    /// Waits while a running process holds the lock, reclaims a lock whose
    /// holder has exited, and gives up after --maxattempts waits (0 = never).
    ///
    /// The lock directory must be on a filesystem that supports hard links:
    /// the lock is published by linking a fully written temporary file to
    /// the lock name.
    Lock(LockArgs),

    /// Release a serialization lock.
    ///
    /// Removes the lock file. Fails if no lock file exists.
    Unlock(UnlockArgs),

    /// Describe the available commands of this extension.
    Describe(DescribeArgs),

    /// Initialize the extension by creating the lock directory.
    ///
    /// Also removes temporary files left next to the lock by processes that
    /// died while creating it.
    Initialize(InitializeArgs),
}

/// Arguments for the `lock` command.
#[derive(Parser, Debug)]
pub struct LockArgs {
    /// Name of the file to use for serialization [env: SERIALIZER_FILE_NAME].
    #[arg(long)]
    pub filename: Option<String>,

    /// Directory to store the serialization file in [env: SERIALIZER_DIR].
    #[arg(long)]
    pub filedir: Option<PathBuf>,

    /// Seconds to sleep between checks while the lock is held [env: SERIALIZER_SLEEP_SECONDS].
    #[arg(long)]
    pub sleepseconds: Option<u64>,

    /// Maximum number of waits before giving up, 0 for no limit [env: SERIALIZER_MAX_ATTEMPTS].
    #[arg(long)]
    pub maxattempts: Option<u32>,
}

/// Arguments for the `unlock` command.
#[derive(Parser, Debug)]
pub struct UnlockArgs {
    /// Name of the file to use for serialization [env: SERIALIZER_FILE_NAME].
    #[arg(long)]
    pub filename: Option<String>,

    /// Directory to store the serialization file in [env: SERIALIZER_DIR].
    #[arg(long)]
    pub filedir: Option<PathBuf>,
}

/// Output format for `describe`.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DescribeFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

/// Arguments for the `describe` command.
#[derive(Parser, Debug)]
pub struct DescribeArgs {
    /// Output format.
    #[arg(long = "format", value_enum, default_value_t = DescribeFormat::Text)]
    pub format: DescribeFormat,
}

/// Arguments for the `initialize` command.
#[derive(Parser, Debug)]
pub struct InitializeArgs {
    /// Name of the file to use for serialization [env: SERIALIZER_FILE_NAME].
    #[arg(long)]
    pub filename: Option<String>,

    /// Directory to store the serialization file in [env: SERIALIZER_DIR].
    #[arg(long)]
    pub filedir: Option<PathBuf>,

    /// Force initialization (if supported).
    #[arg(long)]
    pub force: bool,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Logging switches gathered from the global options.
    pub fn log_options(&self) -> LogOptions {
        LogOptions {
            level: self.log_level.clone(),
            timestamps: self.log_timestamps,
            levels: self.log_levels,
            json: self.meltano_log_json,
        }
    }
}

impl From<LockArgs> for LockOverrides {
    fn from(args: LockArgs) -> Self {
        LockOverrides {
            filename: args.filename,
            directory: args.filedir,
            retry_seconds: args.sleepseconds,
            max_attempts: args.maxattempts,
        }
    }
}

impl From<UnlockArgs> for LockOverrides {
    fn from(args: UnlockArgs) -> Self {
        LockOverrides {
            filename: args.filename,
            directory: args.filedir,
            ..Default::default()
        }
    }
}
