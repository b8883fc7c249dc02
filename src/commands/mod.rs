//! Command implementations for pipeline-serializer.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Lock settings are resolved here, once per invocation,
//! so every handler sees the same explicit → environment → default order.

mod describe;
mod initialize;

use crate::cli::{Command, LockArgs, UnlockArgs};
use crate::config::LockSettings;
use crate::error::Result;
use crate::locks::{AcquireOutcome, LockManager};
use tracing::debug;

/// Dispatch a command to its implementation.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Lock(args) => cmd_lock(args),
        Command::Unlock(args) => cmd_unlock(args),
        Command::Describe(args) => describe::cmd_describe(args),
        Command::Initialize(args) => initialize::cmd_initialize(args),
    }
}

fn cmd_lock(args: LockArgs) -> Result<()> {
    let settings = LockSettings::resolve(args.into())?;
    let manager = LockManager::new(settings);

    let acquisition = manager.acquire()?;
    match acquisition.outcome {
        AcquireOutcome::Created => debug!(
            path = %acquisition.path.display(),
            holder = manager.holder_pid(),
            attempts = acquisition.attempts,
            "lock held"
        ),
        AcquireOutcome::Reclaimed { previous_holder } => debug!(
            path = %acquisition.path.display(),
            holder = manager.holder_pid(),
            previous_holder,
            attempts = acquisition.attempts,
            "lock held after reclaiming stale lock"
        ),
    }
    Ok(())
}

fn cmd_unlock(args: UnlockArgs) -> Result<()> {
    let settings = LockSettings::resolve(args.into())?;
    LockManager::new(settings).release()?;
    Ok(())
}
