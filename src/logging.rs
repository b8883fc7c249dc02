//! Tracing subscriber setup.
//!
//! Logs go to stderr so stdout stays free for command output (`describe`).
//! The switches mirror the hosting platform's conventions: a level, optional
//! timestamps, optional level prefixes, and a JSON mode.

use crate::error::{Result, SerializerError};
use std::io::IsTerminal;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

/// How log lines are rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogOptions {
    pub level: String,
    pub timestamps: bool,
    pub levels: bool,
    pub json: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            timestamps: false,
            levels: false,
            json: false,
        }
    }
}

/// Parse a level name, case-insensitively. Accepts the Python-style aliases
/// `warning` and `critical` alongside the tracing names.
pub fn parse_log_level(raw: &str) -> Result<LevelFilter> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok(LevelFilter::TRACE),
        "debug" => Ok(LevelFilter::DEBUG),
        "info" => Ok(LevelFilter::INFO),
        "warn" | "warning" => Ok(LevelFilter::WARN),
        "error" | "critical" => Ok(LevelFilter::ERROR),
        "off" => Ok(LevelFilter::OFF),
        _ => Err(SerializerError::UserError(format!(
            "invalid log level '{}' (expected trace, debug, info, warning, error or critical)",
            raw
        ))),
    }
}

/// Install the global subscriber. Calling it twice is an error.
pub fn init(options: &LogOptions) -> Result<()> {
    let level = parse_log_level(&options.level)?;
    let filter = EnvFilter::default().add_directive(level.into());
    // Colour only when a person is reading; captured stderr stays plain.
    let ansi = std::io::stderr().is_terminal();

    let layer: Box<dyn Layer<Registry> + Send + Sync> = if options.json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .with_target(false)
            .boxed()
    } else if options.timestamps {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(ansi)
            .with_target(false)
            .with_level(options.levels)
            .boxed()
    } else {
        fmt::layer()
            .without_time()
            .with_writer(std::io::stderr)
            .with_ansi(ansi)
            .with_target(false)
            .with_level(options.levels)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
        .map_err(|e| SerializerError::UserError(format!("failed to initialize logging: {}", e)))
}
