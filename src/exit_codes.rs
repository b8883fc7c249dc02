//! Exit code constants for the pipeline-serializer CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid configuration)
//! - 2: Corrupt lock data (holder id unreadable)
//! - 3: Filesystem failure (create/open/write/delete)
//! - 4: Lock busy (live holder outlasted the attempt budget)
//! - 5: Lock not found (unlock with no lock file present)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments or invalid configuration values.
pub const USER_ERROR: i32 = 1;

/// The existing lock file does not start with a parsable holder id.
pub const CORRUPT_LOCK_DATA: i32 = 2;

/// A filesystem operation failed for a reason other than "already exists".
pub const FILESYSTEM_FAILURE: i32 = 3;

/// The lock stayed held by a live process for every allowed attempt.
pub const LOCK_BUSY: i32 = 4;

/// Release was requested but no lock file exists.
pub const LOCK_NOT_FOUND: i32 = 5;
