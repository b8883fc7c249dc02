//! Locking subsystem for pipeline-serializer.
//!
//! A single lock file serializes a pipeline step across independent OS
//! processes that share nothing but a filesystem.
//!
//! # Lock Files
//!
//! The lock file lives at `directory/filename` (default
//! `/tmp/serializer.lck` on Unix). It is created with **create-if-absent**
//! semantics so that only one process can create it at a time; its existence
//! is the lock.
//!
//! # Lock Content
//!
//! Two lines of UTF-8 text:
//! - the holder process id (authoritative)
//! - the acquisition time as `YYYY-MM-DD HH:MM:SS` (informational)
//!
//! # Stale Locks
//!
//! A lock whose holder process is no longer running is reclaimed on the spot,
//! without sleeping. A lock held by a live process is polled every retry
//! interval until it goes away, goes stale, or the attempt budget runs out.
//!
//! # Release
//!
//! Release deletes the file unconditionally. There is no ownership check, so
//! cleanup tooling may release a lock on behalf of a crashed holder.

mod liveness;
mod manager;
mod record;


// Re-export public API
pub use liveness::is_process_alive;
pub use manager::{AcquireOutcome, LockManager};
