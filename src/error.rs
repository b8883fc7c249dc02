//! Error types for the pipeline-serializer CLI.
//!
//! Uses thiserror for derive macros. Every variant maps to its own exit code
//! so orchestration tooling can tell a busy lock from a broken one.

use crate::exit_codes;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for serializer operations.
#[derive(Error, Debug)]
pub enum SerializerError {
    /// User provided invalid arguments or configuration.
    #[error("{0}")]
    UserError(String),

    /// A live holder kept the lock for every allowed attempt.
    #[error(
        "lock '{}' is still held by process {holder} after {attempts} attempts ({waited_secs}s)",
        path.display()
    )]
    LockBusyTimeout {
        path: PathBuf,
        holder: i64,
        attempts: u32,
        waited_secs: u64,
    },

    /// The existing lock file has no parsable holder id on its first line.
    #[error("corrupt lock data in '{}': {detail}", path.display())]
    CorruptLockData { path: PathBuf, detail: String },

    /// A filesystem operation failed for a reason other than "already exists".
    #[error("{context}: {source}")]
    Filesystem {
        context: String,
        #[source]
        source: io::Error,
    },

    /// Release was requested but the lock file is absent.
    #[error("lock file '{}' does not exist", .0.display())]
    LockNotFound(PathBuf),
}

impl SerializerError {
    /// Wrap an I/O error with a short description of what was being attempted.
    pub fn filesystem(context: impl Into<String>, source: io::Error) -> Self {
        SerializerError::Filesystem {
            context: context.into(),
            source,
        }
    }

    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            SerializerError::UserError(_) => exit_codes::USER_ERROR,
            SerializerError::LockBusyTimeout { .. } => exit_codes::LOCK_BUSY,
            SerializerError::CorruptLockData { .. } => exit_codes::CORRUPT_LOCK_DATA,
            SerializerError::Filesystem { .. } => exit_codes::FILESYSTEM_FAILURE,
            SerializerError::LockNotFound(_) => exit_codes::LOCK_NOT_FOUND,
        }
    }
}

/// Result type alias for serializer operations.
pub type Result<T> = std::result::Result<T, SerializerError>;
