//! Configuration for pipeline-serializer.
//!
//! Every lock setting is resolved in priority order: an explicit command-line
//! value, then the matching `SERIALIZER_*` environment variable, then the
//! hard-coded default.

mod model;

#[cfg(test)]
mod tests;

// Re-export public API
pub use model::{LockOverrides, LockSettings};
