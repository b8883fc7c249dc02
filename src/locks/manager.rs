//! Lock acquisition and release.

use super::liveness::{default_holder_pid, is_process_alive};
use super::record::{LockRecord, RecordError};
use crate::config::LockSettings;
use crate::error::{Result, SerializerError};
use crate::fs::create_exclusive;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::thread;
use tracing::{debug, error, info, warn};

/// Waiting attempts between progress log lines.
pub const PROGRESS_EVERY: u32 = 10;

/// How the lock came to be held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// The lock file was absent and we created it.
    Created,
    /// The recorded holder was no longer running and we took the lock over.
    Reclaimed { previous_holder: i64 },
}

/// Result of a successful [`LockManager::acquire`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquisition {
    pub path: PathBuf,
    pub outcome: AcquireOutcome,
    /// Waiting attempts spent on a live holder before the lock was obtained.
    pub attempts: u32,
}

/// Serializes a critical section across processes through a single lock file.
///
/// The file's existence is the lock; its first line names the holder process.
/// The only synchronization primitive relied on is the filesystem's atomic
/// create-if-absent.
#[derive(Debug, Clone)]
pub struct LockManager {
    settings: LockSettings,
    holder_pid: u32,
}

impl LockManager {
    /// A manager that records the invoking process's parent as the holder.
    pub fn new(settings: LockSettings) -> Self {
        Self::with_holder(settings, default_holder_pid())
    }

    /// A manager that records `holder_pid` as the holder.
    pub fn with_holder(settings: LockSettings, holder_pid: u32) -> Self {
        Self {
            settings,
            holder_pid,
        }
    }

    pub fn lock_path(&self) -> PathBuf {
        self.settings.lock_path()
    }

    pub fn holder_pid(&self) -> u32 {
        self.holder_pid
    }

    /// Block until the lock is held by this manager's holder.
    ///
    /// Each pass tries an atomic create. If the file exists, its holder is
    /// probed: a dead holder is reclaimed immediately, a live one costs one
    /// attempt and a sleep of the retry interval.
    ///
    /// # Errors
    ///
    /// * `LockBusyTimeout` - a live holder outlasted `max_attempts` (when non-zero)
    /// * `CorruptLockData` - the existing file has no parsable holder id
    /// * `Filesystem` - create/read/remove failed for any other reason
    pub fn acquire(&self) -> Result<Acquisition> {
        let path = self.lock_path();
        let interval = self.settings.retry_interval();
        let max_attempts = self.settings.max_attempts;

        info!(path = %path.display(), "attempting to create lock file");

        let mut attempts: u32 = 0;
        loop {
            if self.try_create(&path)? {
                info!(path = %path.display(), holder = self.holder_pid, "created lock file");
                return Ok(Acquisition {
                    path,
                    outcome: AcquireOutcome::Created,
                    attempts,
                });
            }

            let Some(existing) = read_record(&path)? else {
                debug!(path = %path.display(), "lock file disappeared, retrying");
                continue;
            };

            if !is_process_alive(existing.holder_pid) {
                if self.reclaim(&path, &existing)? {
                    info!(
                        path = %path.display(),
                        previous_holder = existing.holder_pid,
                        holder = self.holder_pid,
                        "reclaimed stale lock"
                    );
                    return Ok(Acquisition {
                        path,
                        outcome: AcquireOutcome::Reclaimed {
                            previous_holder: existing.holder_pid,
                        },
                        attempts,
                    });
                }
                debug!(path = %path.display(), "another process reclaimed the lock first");
                continue;
            }

            thread::sleep(interval);
            attempts = attempts.saturating_add(1);
            let waited_secs = u64::from(attempts).saturating_mul(self.settings.retry_seconds);

            if max_attempts > 0 && attempts >= max_attempts {
                info!(attempts, waited_secs, "tried {} times totaling {} seconds", attempts, waited_secs);
                return Err(SerializerError::LockBusyTimeout {
                    path,
                    holder: existing.holder_pid,
                    attempts,
                    waited_secs,
                });
            }

            if attempts % PROGRESS_EVERY == 0 {
                info!(
                    attempts,
                    waited_secs,
                    holder = existing.holder_pid,
                    "tried {} times totaling {} seconds",
                    attempts,
                    waited_secs
                );
            }
        }
    }

    /// Delete the lock file.
    ///
    /// There is no ownership check: any caller that knows the path may release.
    ///
    /// # Errors
    ///
    /// * `LockNotFound` - the lock file does not exist
    /// * `Filesystem` - the file exists but could not be removed
    pub fn release(&self) -> Result<PathBuf> {
        let path = self.lock_path();
        info!(path = %path.display(), "attempting to remove lock file");

        fs::remove_file(&path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                SerializerError::LockNotFound(path.clone())
            } else {
                SerializerError::filesystem(
                    format!("failed to remove lock file '{}'", path.display()),
                    e,
                )
            }
        })?;

        info!(path = %path.display(), "removed lock file");
        Ok(path)
    }

    /// One atomic create-if-absent. `Ok(false)` means the name is taken.
    fn try_create(&self, path: &Path) -> Result<bool> {
        let record = LockRecord::new(self.holder_pid);
        match create_exclusive(path, record.render().as_bytes()) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(SerializerError::filesystem(
                format!("failed to create lock file '{}'", path.display()),
                e,
            )),
        }
    }

    /// Replace a lock whose holder is dead: confirm the holder is unchanged,
    /// delete the file, then create it again through the same atomic primitive.
    ///
    /// `Ok(false)` means another process took the lock in between. Two
    /// reclaimers that both pass the confirmation can still race on the delete;
    /// the create step guarantees at most one of them ends up holding the file,
    /// but the loser may have deleted the winner's fresh lock first.
    fn reclaim(&self, path: &Path, stale: &LockRecord) -> Result<bool> {
        match read_record(path)? {
            Some(current) if current.holder_pid == stale.holder_pid => {}
            _ => return Ok(false),
        }

        warn!(
            path = %path.display(),
            holder = stale.holder_pid,
            acquired_at = ?stale.acquired_at,
            "lock holder is no longer running"
        );

        match fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(SerializerError::filesystem(
                    format!("failed to remove stale lock file '{}'", path.display()),
                    e,
                ));
            }
        }

        self.try_create(path)
    }
}

/// Read the holder record. `Ok(None)` if the file vanished in the meantime.
fn read_record(path: &Path) -> Result<Option<LockRecord>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(SerializerError::filesystem(
                format!("failed to read lock file '{}'", path.display()),
                e,
            ));
        }
    };

    let content = String::from_utf8_lossy(&bytes);
    LockRecord::parse(&content).map(Some).map_err(|e: RecordError| {
        error!(path = %path.display(), reason = %e, "lock file holds corrupt data");
        SerializerError::CorruptLockData {
            path: path.to_path_buf(),
            detail: e.to_string(),
        }
    })
}
