//! Access-time bookkeeping for cached files
//!
//! The disk tier has no index: a file's last-access timestamp is the only
//! liveness record. Every touch and every sweep goes through these helpers
//! so they agree on the same timestamp source.

use assetcache_core::{Error, Result};
use std::fs::{self, FileTimes, Metadata, OpenOptions};
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Set the last-access time of `path`, leaving the modification time alone
pub fn set_accessed(path: &Path, when: SystemTime) -> Result<()> {
    let file = OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(|e| Error::file_system(path, "open for touch", e))?;

    file.set_times(FileTimes::new().set_accessed(when))
        .map_err(|e| Error::file_system(path, "set access time", e))
}

/// Mark `path` as accessed now
pub fn touch(path: &Path) -> Result<()> {
    set_accessed(path, SystemTime::now())
}

/// Last-access time from metadata, falling back to the modification time on
/// platforms or filesystems that do not record access times
pub fn last_access(metadata: &Metadata) -> Option<SystemTime> {
    metadata.accessed().or_else(|_| metadata.modified()).ok()
}

/// How long ago `path` was last accessed
pub fn access_age(path: &Path, now: SystemTime) -> Result<Duration> {
    let metadata = fs::metadata(path).map_err(|e| Error::file_system(path, "stat", e))?;
    let accessed = last_access(&metadata).unwrap_or(now);
    // Clock skew (access in the future) counts as fresh
    Ok(now.duration_since(accessed).unwrap_or(Duration::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_accessed_in_the_past() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("asset");
        fs::write(&path, b"x").unwrap();

        let two_hours_ago = SystemTime::now() - Duration::from_secs(2 * 3600);
        set_accessed(&path, two_hours_ago).unwrap();

        let age = access_age(&path, SystemTime::now()).unwrap();
        assert!(age >= Duration::from_secs(2 * 3600 - 5));
    }

    #[test]
    fn test_touch_refreshes_age() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("asset");
        fs::write(&path, b"x").unwrap();
        set_accessed(&path, SystemTime::now() - Duration::from_secs(3600)).unwrap();

        touch(&path).unwrap();

        let age = access_age(&path, SystemTime::now()).unwrap();
        assert!(age < Duration::from_secs(60));
    }

    #[test]
    fn test_touch_keeps_contents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("asset");
        fs::write(&path, b"immutable").unwrap();

        touch(&path).unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"immutable");
    }

    #[test]
    fn test_touch_missing_file_errors() {
        let temp_dir = TempDir::new().unwrap();
        assert!(touch(&temp_dir.path().join("missing")).is_err());
    }
}
