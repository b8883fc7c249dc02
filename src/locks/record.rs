//! Lock file content: holder id and acquisition time.

use chrono::{DateTime, Local, NaiveDateTime, Timelike};
use std::fmt;

/// Timestamp layout of the informational second line.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// What a lock file says about its holder.
///
/// Rendered as two lines:
///
/// ```text
/// <holder_pid>
/// <YYYY-MM-DD HH:MM:SS>
/// ```
///
/// Only the first line is authoritative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockRecord {
    /// Process id recorded as the holder. Kept signed so a recorded value
    /// outside the OS range still parses and is simply reported as not running.
    pub holder_pid: i64,

    /// Creation time; informational only, never used for expiry.
    pub acquired_at: Option<NaiveDateTime>,
}

/// Why a lock file could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    Empty,
    InvalidHolder(String),
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::Empty => write!(f, "lock file is empty"),
            RecordError::InvalidHolder(line) => {
                write!(f, "first line '{}' is not a process id", line)
            }
        }
    }
}

impl LockRecord {
    /// A record for `holder_pid` stamped with the current local time.
    pub fn new(holder_pid: u32) -> Self {
        Self::at(holder_pid, Local::now())
    }

    /// A record for `holder_pid` stamped with `when`.
    pub fn at(holder_pid: u32, when: DateTime<Local>) -> Self {
        Self {
            holder_pid: i64::from(holder_pid),
            // Whole seconds only, matching what is written.
            acquired_at: when.naive_local().with_nanosecond(0),
        }
    }

    /// Render the file content.
    pub fn render(&self) -> String {
        match self.acquired_at {
            Some(ts) => format!("{}\n{}\n", self.holder_pid, ts.format(TIMESTAMP_FORMAT)),
            None => format!("{}\n", self.holder_pid),
        }
    }

    /// Parse file content. The holder id must be on the first line; a missing
    /// or malformed timestamp is tolerated.
    pub fn parse(content: &str) -> Result<Self, RecordError> {
        let mut lines = content.lines();
        let first = lines.next().map(str::trim).unwrap_or("");
        if first.is_empty() {
            return Err(RecordError::Empty);
        }

        let holder_pid = first
            .parse::<i64>()
            .map_err(|_| RecordError::InvalidHolder(first.to_string()))?;

        let acquired_at = lines
            .next()
            .and_then(|line| NaiveDateTime::parse_from_str(line.trim(), TIMESTAMP_FORMAT).ok());

        Ok(Self {
            holder_pid,
            acquired_at,
        })
    }
}
