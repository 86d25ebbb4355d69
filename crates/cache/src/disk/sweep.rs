//! Access-time based expiry of cached files

use super::DiskTier;
use assetcache_utils::{is_temp_file, last_access};
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Outcome of one sweep pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Shard directories visited
    pub shards: usize,
    /// Files examined
    pub scanned: usize,
    /// Files deleted for being idle longer than the max age
    pub removed: usize,
    /// Files or directories that could not be inspected or deleted
    pub failed: usize,
}

impl DiskTier {
    /// Delete every file whose last access is older than `max_age`
    ///
    /// Safe to run concurrently with writes: files being written are fresh
    /// temporaries, and a file renamed into place mid-sweep is at worst
    /// examined with a fresh access time. Failures are logged and counted,
    /// never abort the pass.
    pub fn sweep(&self, max_age: Duration) -> SweepReport {
        let mut report = SweepReport::default();
        let now = SystemTime::now();

        let shards = match fs::read_dir(self.root()) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!("Failed to list cache directory {}: {}", self.root().display(), e);
                report.failed += 1;
                return report;
            }
        };

        for shard in shards.flatten() {
            if !shard.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }
            report.shards += 1;
            sweep_shard(&shard.path(), now, max_age, &mut report);
        }

        report
    }
}

fn sweep_shard(shard: &Path, now: SystemTime, max_age: Duration, report: &mut SweepReport) {
    let files = match fs::read_dir(shard) {
        Ok(entries) => entries,
        Err(e) => {
            // Removed by a concurrent clear
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to list shard {}: {}", shard.display(), e);
                report.failed += 1;
            }
            return;
        }
    };

    for file in files.flatten() {
        let path = file.path();
        let metadata = match file.metadata() {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => continue,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to stat {}: {}", path.display(), e);
                    report.failed += 1;
                }
                continue;
            }
        };
        report.scanned += 1;

        let Some(accessed) = last_access(&metadata) else {
            continue;
        };
        let age = now.duration_since(accessed).unwrap_or(Duration::ZERO);
        if age <= max_age {
            continue;
        }

        match fs::remove_file(&path) {
            Ok(()) => {
                report.removed += 1;
                if is_temp_file(&path) {
                    tracing::debug!("Removed abandoned temporary file {}", path.display());
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!("Failed to remove expired file {}: {}", path.display(), e);
                report.failed += 1;
            }
        }
    }
}
