//! `initialize`: prepare the lock directory.
//!
//! `lock` never creates directories, so a pipeline that points
//! `SERIALIZER_DIR` somewhere new runs this once up front. It also clears
//! temporary files that a process killed mid-create left beside the lock.

use crate::cli::InitializeArgs;
use crate::config::{LockOverrides, LockSettings};
use crate::error::{Result, SerializerError};
use crate::fs::sweep_temp_files;
use crate::locks::is_process_alive;
use std::fs;
use std::path::Path;
use tracing::info;

pub(super) fn cmd_initialize(args: InitializeArgs) -> Result<()> {
    let settings = LockSettings::resolve(LockOverrides {
        filename: args.filename,
        directory: args.filedir,
        ..Default::default()
    })?;

    if args.force {
        info!("--force has no additional effect; initialization is idempotent");
    }

    ensure_lock_dir(&settings.directory)?;
    remove_stale_temp_files(&settings.lock_path())
}

/// Delete temporary files for `lock_path` whose creating process is gone.
fn remove_stale_temp_files(lock_path: &Path) -> Result<()> {
    let removed = sweep_temp_files(lock_path, is_process_alive).map_err(|e| {
        SerializerError::filesystem(
            format!("failed to clean temporary files for '{}'", lock_path.display()),
            e,
        )
    })?;

    for path in &removed {
        info!(path = %path.display(), "removed stale temporary file");
    }
    Ok(())
}

/// Create `dir` (and parents) unless it already exists as a directory.
fn ensure_lock_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        info!(path = %dir.display(), "lock directory already exists");
        return Ok(());
    }

    if dir.exists() {
        return Err(SerializerError::UserError(format!(
            "lock directory '{}' exists but is not a directory",
            dir.display()
        )));
    }

    fs::create_dir_all(dir).map_err(|e| {
        SerializerError::filesystem(
            format!("failed to create lock directory '{}'", dir.display()),
            e,
        )
    })?;
    info!(path = %dir.display(), "created lock directory");
    Ok(())
}
