//! Lock settings and their resolution order.

use crate::error::{Result, SerializerError};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming the lock file.
pub const ENV_FILE_NAME: &str = "SERIALIZER_FILE_NAME";
/// Environment variable naming the lock directory.
pub const ENV_DIR: &str = "SERIALIZER_DIR";
/// Environment variable holding the seconds to sleep between attempts.
pub const ENV_SLEEP_SECONDS: &str = "SERIALIZER_SLEEP_SECONDS";
/// Environment variable holding the attempt budget (0 = unbounded).
pub const ENV_MAX_ATTEMPTS: &str = "SERIALIZER_MAX_ATTEMPTS";

pub const DEFAULT_FILE_NAME: &str = "serializer.lck";
pub const DEFAULT_RETRY_SECONDS: u64 = 1;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 0;

/// Directory every caller falls back to. Fixed rather than taken from
/// `TMPDIR`, which differs between processes.
#[cfg(unix)]
pub fn default_lock_dir() -> PathBuf {
    PathBuf::from("/tmp")
}

#[cfg(not(unix))]
pub fn default_lock_dir() -> PathBuf {
    std::env::temp_dir()
}

/// Values given explicitly on the command line. `None` means "not given".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockOverrides {
    pub filename: Option<String>,
    pub directory: Option<PathBuf>,
    pub retry_seconds: Option<u64>,
    pub max_attempts: Option<u32>,
}

/// Fully resolved lock settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockSettings {
    /// Lock file name (default: `serializer.lck`).
    pub filename: String,

    /// Directory holding the lock file (default: `/tmp` on Unix).
    pub directory: PathBuf,

    /// Seconds to sleep between attempts while a live process holds the lock.
    pub retry_seconds: u64,

    /// Attempt budget while waiting on a live holder; 0 waits forever.
    pub max_attempts: u32,
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            filename: DEFAULT_FILE_NAME.to_string(),
            directory: default_lock_dir(),
            retry_seconds: DEFAULT_RETRY_SECONDS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl LockSettings {
    /// Resolve settings from explicit values, then the process environment,
    /// then hard-coded defaults.
    pub fn resolve(overrides: LockOverrides) -> Result<Self> {
        Self::resolve_with(overrides, |key| std::env::var(key).ok())
    }

    /// Resolve settings using `lookup` in place of the process environment.
    pub fn resolve_with<F>(overrides: LockOverrides, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty variables behave as if unset.
        let env = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let filename = match overrides.filename {
            Some(name) => name,
            None => env(ENV_FILE_NAME).unwrap_or(defaults.filename),
        };

        let directory = match overrides.directory {
            Some(dir) => dir,
            None => env(ENV_DIR).map(PathBuf::from).unwrap_or(defaults.directory),
        };

        let retry_seconds = match overrides.retry_seconds {
            Some(secs) => secs,
            None => match env(ENV_SLEEP_SECONDS) {
                Some(raw) => parse_env_number(ENV_SLEEP_SECONDS, &raw)?,
                None => defaults.retry_seconds,
            },
        };

        let max_attempts = match overrides.max_attempts {
            Some(n) => n,
            None => match env(ENV_MAX_ATTEMPTS) {
                Some(raw) => parse_env_number(ENV_MAX_ATTEMPTS, &raw)?,
                None => defaults.max_attempts,
            },
        };

        let settings = Self {
            filename,
            directory,
            retry_seconds,
            max_attempts,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Validate the resolved values.
    pub fn validate(&self) -> Result<()> {
        if self.filename.trim().is_empty() {
            return Err(SerializerError::UserError(
                "lock file name must not be empty".to_string(),
            ));
        }

        if self.filename.contains(['/', '\\']) || self.filename == "." || self.filename == ".." {
            return Err(SerializerError::UserError(format!(
                "lock file name '{}' must be a plain file name; use --filedir for the directory",
                self.filename
            )));
        }

        Ok(())
    }

    /// Full path of the lock file: `directory/filename`.
    pub fn lock_path(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }

    /// Sleep between attempts as a `Duration`.
    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_seconds)
    }
}

fn parse_env_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| {
        SerializerError::UserError(format!(
            "environment variable {} must be a non-negative integer, got '{}'",
            key, raw
        ))
    })
}
