//! Filesystem utilities for pipeline-serializer.
//!
//! The only primitive the lock manager relies on for synchronization lives
//! here: an atomic create-if-absent that publishes content and name together.

pub mod atomic;

pub use atomic::{create_exclusive, sweep_temp_files};
