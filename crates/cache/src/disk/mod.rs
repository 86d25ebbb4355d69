//! Disk tier: one file per asset under a sharded directory tree
//!
//! All methods are blocking and are meant to run on tokio's blocking pool.
//! The filesystem layout is the index: `root/<shard>/<sanitized id>`, see
//! [`crate::paths`]. Liveness is the file's last-access time, refreshed on
//! every touch and successful read, and checked by [`DiskTier::sweep`].

pub mod format;
mod sweep;

pub use sweep::SweepReport;

use crate::errors::DiskReadError;
use crate::paths::map_to_path;
use assetcache_core::{Asset, Error, Result};
use assetcache_utils::{check_writable, set_accessed, write_atomic};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Space used by the disk tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskUsage {
    pub shards: usize,
    pub files: usize,
    pub bytes: u64,
}

/// File-per-key persistent store
#[derive(Debug, Clone)]
pub struct DiskTier {
    root: PathBuf,
}

impl DiskTier {
    /// Open (creating if needed) a disk tier rooted at `root`
    ///
    /// Fails when the root cannot be created or is not a writable directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        fs::create_dir_all(&root)
            .map_err(|e| Error::file_system(&root, "create cache directory", e))?;

        let metadata =
            fs::metadata(&root).map_err(|e| Error::file_system(&root, "stat cache directory", e))?;
        if !metadata.is_dir() {
            return Err(Error::configuration(format!(
                "cache directory '{}' is not a directory",
                root.display()
            )));
        }
        if let Err(e) = check_writable(&root) {
            return Err(Error::configuration(format!(
                "cache directory '{}' is not writable: {}",
                root.display(),
                e
            )));
        }

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the file for `key` lives
    pub fn path_for(&self, key: &str) -> PathBuf {
        map_to_path(&self.root, key)
    }

    pub fn exists(&self, key: &str) -> bool {
        self.path_for(key).is_file()
    }

    /// Read and decode the asset stored for `key`
    ///
    /// A file that fails to decode, or decodes to a different asset id, is
    /// deleted before [`DiskReadError::Corrupt`] is returned so the next store
    /// of that key rewrites it.
    pub fn read(&self, key: &str) -> std::result::Result<Asset, DiskReadError> {
        let path = self.path_for(key);

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(DiskReadError::NotFound),
            Err(e) => return Err(DiskReadError::Io { path, source: e }),
        };

        let reason = match format::decode(&bytes) {
            Ok(asset) if asset.id == key => {
                if let Err(e) = set_accessed(&path, SystemTime::now()) {
                    tracing::debug!("Failed to refresh access time of {}: {}", path.display(), e);
                }
                return Ok(asset);
            }
            Ok(asset) => format!("file holds asset '{}'", asset.id),
            Err(reason) => reason,
        };

        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!("Failed to remove corrupt cache file {}: {}", path.display(), e);
            }
        }

        Err(DiskReadError::Corrupt { path, reason })
    }

    /// Persist `asset` atomically (temp file in the shard dir, then rename)
    pub fn write(&self, asset: &Asset) -> Result<PathBuf> {
        let path = self.path_for(&asset.id);
        let bytes = format::encode(asset)?;
        write_atomic(&path, &bytes)?;
        Ok(path)
    }

    /// Refresh the access time of `key`'s file
    ///
    /// Returns `Ok(false)` when there is no file to touch.
    pub fn touch(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key);
        match set_accessed(&path, SystemTime::now()) {
            Ok(()) => Ok(true),
            Err(Error::FileSystem { source, .. }) if source.kind() == ErrorKind::NotFound => {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Delete `key`'s file; returns whether one existed
    pub fn delete(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::file_system(path, "remove cache file", e)),
        }
    }

    /// Remove every shard directory, returning how many were deleted
    ///
    /// Directories that cannot be removed are logged and skipped.
    pub fn clear_all(&self) -> Result<usize> {
        let entries = fs::read_dir(&self.root)
            .map_err(|e| Error::file_system(&self.root, "list cache directory", e))?;

        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }
            match fs::remove_dir_all(&path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!("Failed to remove shard directory {}: {}", path.display(), e);
                }
            }
        }
        Ok(removed)
    }

    /// Count shard directories, files and bytes under the root
    pub fn usage(&self) -> Result<DiskUsage> {
        let entries = fs::read_dir(&self.root)
            .map_err(|e| Error::file_system(&self.root, "list cache directory", e))?;

        let mut usage = DiskUsage::default();
        for shard in entries.flatten() {
            if !shard.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }
            usage.shards += 1;

            let Ok(files) = fs::read_dir(shard.path()) else {
                continue;
            };
            for file in files.flatten() {
                if let Ok(metadata) = file.metadata() {
                    if metadata.is_file() {
                        usage.files += 1;
                        usage.bytes += metadata.len();
                    }
                }
            }
        }
        Ok(usage)
    }
}
