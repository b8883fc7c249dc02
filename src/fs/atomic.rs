//! Atomic create-if-absent for lock files.
//!
//! A plain `create_new` open is atomic with respect to other creators, but it
//! publishes an empty file: a competing process may open it and read nothing
//! before the creator has written its holder id. That would look exactly like
//! a corrupt lock. To avoid that window, the content is published together
//! with the name:
//!
//! 1. Write the content to a temporary file in the same directory
//! 2. Sync the file to disk (fsync)
//! 3. Hard-link the temporary file to the target name, which fails with
//!    `AlreadyExists` if any other process owns the name
//! 4. Remove the temporary name
//!
//! # Important Notes
//!
//! - The temporary file lives next to the target so the link never crosses
//!   a filesystem boundary
//! - Temporary names carry the creating process id and a per-process counter
//!   (`.{filename}.{pid}.{n}.tmp`), so concurrent creators never share one
//! - On crash between steps 1 and 4 a temporary file may remain; it never
//!   counts as a lock, and [`sweep_temp_files`] removes it once its creator
//!   is gone

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Create `path` with `content`, failing if the name already exists.
///
/// Returns an `io::Error` of kind `AlreadyExists` when another process holds
/// the name; every other error kind is a genuine filesystem failure.
pub fn create_exclusive(path: &Path, content: &[u8]) -> io::Result<()> {
    let temp_path = generate_temp_path(path)?;

    write_and_sync(&temp_path, content)?;

    let linked = fs::hard_link(&temp_path, path);
    let _ = fs::remove_file(&temp_path);
    linked?;

    sync_parent(path);
    Ok(())
}

/// Generate a unique temporary file path in the same directory as the target.
fn generate_temp_path(target: &Path) -> io::Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid lock file path '{}'", target.display()),
        )
    })?;

    let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let temp_name = format!(".{}.{}.{}.tmp", filename, std::process::id(), seq);
    Ok(parent.join(temp_name))
}

/// Remove temporary files left beside `target` by creators that are no
/// longer running. Returns the removed paths.
///
/// Only names of the exact form `.{filename}.{pid}.{n}.tmp` are considered;
/// files whose creator `is_alive` reports as running are kept.
pub fn sweep_temp_files(
    target: &Path,
    is_alive: impl Fn(i64) -> bool,
) -> io::Result<Vec<PathBuf>> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let Some(filename) = target.file_name().and_then(|n| n.to_str()) else {
        return Ok(Vec::new());
    };
    let prefix = format!(".{}.", filename);

    let mut removed = Vec::new();
    for entry in fs::read_dir(parent)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(pid) = name.to_str().and_then(|n| temp_file_creator(n, &prefix)) else {
            continue;
        };
        if is_alive(pid) {
            continue;
        }

        let path = entry.path();
        match fs::remove_file(&path) {
            Ok(()) => removed.push(path),
            // Another sweeper got there first
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
    }
    Ok(removed)
}

/// Creator pid encoded in a temporary file name, if `name` is one.
fn temp_file_creator(name: &str, prefix: &str) -> Option<i64> {
    let middle = name.strip_prefix(prefix)?.strip_suffix(".tmp")?;
    let (pid, seq) = middle.split_once('.')?;
    seq.parse::<u64>().ok()?;
    pid.parse().ok()
}

/// Write content to a fresh file and sync to disk.
fn write_and_sync(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = File::options().write(true).create_new(true).open(path)?;

    let written = file.write_all(content).and_then(|()| file.sync_all());
    if written.is_err() {
        let _ = fs::remove_file(path);
    }
    written
}

/// Persist the new directory entry. Failure here is not fatal.
fn sync_parent(path: &Path) {
    if let Some(parent) = path.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_exclusive_new_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.lck");

        create_exclusive(&file_path, b"1234\n").unwrap();

        let content = fs::read_to_string(&file_path).unwrap();
        assert_eq!(content, "1234\n");
    }

    #[test]
    fn test_create_exclusive_rejects_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.lck");
        fs::write(&file_path, "original").unwrap();

        let err = create_exclusive(&file_path, b"new").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);

        // The existing holder's content is untouched
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "original");
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.lck");

        create_exclusive(&file_path, b"1").unwrap();
        let _ = create_exclusive(&file_path, b"2");

        let entries: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("test.lck")]);
    }

    #[test]
    fn test_missing_directory_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("missing").join("test.lck");

        let err = create_exclusive(&file_path, b"1").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(!file_path.exists());
    }

    #[test]
    fn test_sweep_removes_only_dead_creators() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("test.lck");
        let dead = temp_dir.path().join(".test.lck.111.0.tmp");
        let live = temp_dir.path().join(".test.lck.222.3.tmp");
        let other_lock = temp_dir.path().join(".other.lck.111.0.tmp");
        let unrelated = temp_dir.path().join(".test.lck.notes.tmp");
        for path in [&target, &dead, &live, &other_lock, &unrelated] {
            fs::write(path, "1\n").unwrap();
        }

        let removed = sweep_temp_files(&target, |pid| pid == 222).unwrap();

        assert_eq!(removed, vec![dead.clone()]);
        assert!(!dead.exists());
        assert!(live.exists());
        assert!(other_lock.exists());
        assert!(unrelated.exists());
        // The lock itself is never swept
        assert!(target.exists());
    }

    #[test]
    fn test_sweep_matches_generated_names() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("test.lck");
        let temp_path = generate_temp_path(&target).unwrap();
        fs::write(&temp_path, "1\n").unwrap();

        let kept = sweep_temp_files(&target, |_| true).unwrap();
        assert!(kept.is_empty());
        assert!(temp_path.exists());

        let removed = sweep_temp_files(&target, |_| false).unwrap();
        assert_eq!(removed, vec![temp_path]);
    }

    #[test]
    fn test_temp_paths_are_unique() {
        let target = Path::new("/tmp/serializer.lck");
        let a = generate_temp_path(target).unwrap();
        let b = generate_temp_path(target).unwrap();

        assert_ne!(a, b);
        assert_eq!(a.parent(), target.parent());
        assert!(a.file_name().unwrap().to_str().unwrap().starts_with(".serializer.lck."));
    }
}
