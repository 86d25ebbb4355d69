//! Atomic file operations to prevent readers observing partial files

use assetcache_core::{Error, Result};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Suffix carried by in-flight temporary files
pub const TEMP_SUFFIX: &str = ".tmp";

/// Write data to a file atomically by writing to a temporary file and renaming
///
/// The temporary file lives in the same directory as `path` so the final
/// rename never crosses a filesystem boundary. Concurrent writers of the same
/// path each use their own temporary file; the last rename wins.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| Error::configuration(format!("'{}' has no parent directory", path.display())))?;

    fs::create_dir_all(parent)
        .map_err(|e| Error::file_system(parent, "create parent directory", e))?;

    let temp = TempFile::create(parent)?;
    temp.fill(content)?;
    temp.persist(path)
}

/// Check that files can be created in `dir`
///
/// Creates and removes a temporary file, so ownership, ACLs and read-only
/// mounts are all taken into account.
pub fn check_writable(dir: &Path) -> Result<()> {
    TempFile::create(dir).map(drop)
}

/// Temporary sibling file, removed on drop unless persisted
struct TempFile {
    path: PathBuf,
    file: File,
    persisted: bool,
}

impl TempFile {
    fn create(dir: &Path) -> Result<Self> {
        let path = dir.join(format!(".{}{TEMP_SUFFIX}", Uuid::new_v4()));
        let file = OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&path)
            .map_err(|e| Error::file_system(&path, "create temporary file", e))?;

        Ok(Self {
            path,
            file,
            persisted: false,
        })
    }

    fn fill(&self, content: &[u8]) -> Result<()> {
        (&self.file)
            .write_all(content)
            .map_err(|e| Error::file_system(&self.path, "write temporary file", e))?;
        self.file
            .sync_all()
            .map_err(|e| Error::file_system(&self.path, "sync temporary file", e))
    }

    fn persist(mut self, target: &Path) -> Result<()> {
        fs::rename(&self.path, target)
            .map_err(|e| Error::file_system(target, "rename temporary file into place", e))?;
        self.persisted = true;
        Ok(())
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if !self.persisted {
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// Whether `path` looks like a temporary file produced by [`write_atomic`]
pub fn is_temp_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.') && name.ends_with(TEMP_SUFFIX))
}
