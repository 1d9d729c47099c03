//! Atomic file operations
//!
//! Metrics snapshots must never be observed half-written, so they are
//! replaced with the write-temp, fsync, rename pattern:
//!
//! 1. Write to a uniquely named temporary file (`<name>.<random>.tmp`)
//!    next to the target
//! 2. Call sync_all() to flush to disk
//! 3. Rename temp file to final path (atomic on most filesystems)
//!
//! A reader sees either the old record or the new one, never a torn mix.
//! Concurrent writers to the same target each get their own temp file; the
//! last rename wins.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const TEMP_SUFFIX: &str = ".tmp";

/// Result type for atomic operations
pub type AtomicResult<T> = Result<T, AtomicError>;

/// Errors that can occur during atomic operations
#[derive(Debug, thiserror::Error)]
pub enum AtomicError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Path has no file name: {0}")]
    InvalidPath(PathBuf),
}

/// Atomically write content to a file
///
/// ```ignore
/// atomic_write("data/entities/guest-1/metrics.json", "{}")?;
/// ```
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &str) -> AtomicResult<()> {
    atomic_write_with(path, |file| file.write_all(content.as_bytes()))
}

/// Atomically write content using a writer function
///
/// Avoids building large content in memory first.
pub fn atomic_write_with<P, F>(path: P, write_fn: F) -> AtomicResult<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let path = path.as_ref();
    let file_name = path
        .file_name()
        .ok_or_else(|| AtomicError::InvalidPath(path.to_path_buf()))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut prefix = file_name.to_os_string();
    prefix.push(".");

    // Dropped (and removed) on any early return below
    let mut temp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(TEMP_SUFFIX)
        .tempfile_in(dir)?;

    write_fn(temp.as_file_mut())?;
    temp.as_file().sync_all()?;

    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

/// Clean up any leftover temp files from interrupted writes
///
/// Returns the number of files removed.
pub fn cleanup_temp_files<P: AsRef<Path>>(dir: P) -> AtomicResult<usize> {
    let dir = dir.as_ref();
    let mut cleaned = 0;

    if !dir.exists() {
        return Ok(0);
    }

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();

        if path.is_file() && path.extension().map(|e| e == "tmp").unwrap_or(false) {
            fs::remove_file(&path)?;
            cleaned += 1;
        }
    }

    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn temp_files_in(dir: &Path) -> usize {
        fs::read_dir(dir)
            .unwrap()
            .filter(|entry| {
                let name = entry.as_ref().unwrap().file_name();
                name.to_string_lossy().ends_with(TEMP_SUFFIX)
            })
            .count()
    }

    #[test]
    fn test_atomic_write() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("metrics.json");

        atomic_write(&path, "{\"totalVisits\":1}").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "{\"totalVisits\":1}");

        // Temp file should not exist
        assert_eq!(temp_files_in(temp_dir.path()), 0);
    }

    #[test]
    fn test_atomic_write_replaces_existing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("metrics.json");

        atomic_write(&path, "old").unwrap();
        atomic_write(&path, "new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_failed_write_keeps_old_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("metrics.json");
        atomic_write(&path, "old").unwrap();

        let result = atomic_write_with(&path, |file| {
            file.write_all(b"partial")?;
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        });

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
        assert_eq!(temp_files_in(temp_dir.path()), 0);
    }

    #[test]
    fn test_concurrent_writers_to_one_target() {
        let temp_dir = TempDir::new().unwrap();
        let path = Arc::new(temp_dir.path().join("metrics.json"));

        let handles: Vec<_> = (0..8)
            .map(|writer| {
                let path = Arc::clone(&path);
                thread::spawn(move || {
                    for round in 0..25 {
                        atomic_write(path.as_ref(), &format!("writer {} round {}", writer, round))
                            .unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let content = fs::read_to_string(path.as_ref()).unwrap();
        assert!(content.starts_with("writer "));
        assert!(content.ends_with("round 24"));
        assert_eq!(temp_files_in(temp_dir.path()), 0);
    }

    #[test]
    fn test_rejects_path_without_file_name() {
        let temp_dir = TempDir::new().unwrap();
        let result = atomic_write(temp_dir.path().join(".."), "x");
        assert!(matches!(result, Err(AtomicError::InvalidPath(_))));
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("entities").join("guest").join("metrics.json");

        atomic_write(&path, "nested content").unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_cleanup_temp_files() {
        let temp_dir = TempDir::new().unwrap();

        fs::write(temp_dir.path().join("metrics.tmp"), "temp").unwrap();
        fs::write(temp_dir.path().join("metrics.json.x7Qa2b.tmp"), "temp").unwrap();
        fs::write(temp_dir.path().join("events.jsonl"), "keep").unwrap();

        let cleaned = cleanup_temp_files(temp_dir.path()).unwrap();
        assert_eq!(cleaned, 2);

        assert!(!temp_dir.path().join("metrics.tmp").exists());
        assert!(temp_dir.path().join("events.jsonl").exists());
    }
}
