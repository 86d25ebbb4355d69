//! Statistics, flushing and shutdown

use crate::disk::DiskUsage;
use crate::stats::CacheStatistics;
use assetcache_config::AssetCacheConfig;
use std::path::PathBuf;
use std::time::Duration;

use super::types::AssetCache;

impl AssetCache {
    /// Snapshot of the cache counters
    pub fn statistics(&self) -> CacheStatistics {
        self.inner
            .stats
            .snapshot(self.inner.memory.len(), self.inner.writes.len())
    }

    /// Wait up to `timeout` for every background write to finish
    ///
    /// Returns `false` if writes were still in flight when the timeout
    /// elapsed.
    pub async fn flush(&self, timeout: Duration) -> bool {
        self.inner.writes.wait_idle(timeout).await
    }

    /// Stop the background sweep and flush pending writes
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        self.stop_sweep_task();
        let flushed = self.flush(timeout).await;
        if !flushed {
            tracing::warn!(
                "Asset cache shut down with {} writes still in flight",
                self.inner.writes.len()
            );
        }
        flushed
    }

    /// Files and bytes currently on disk, `None` when memory-only
    pub async fn disk_usage(&self) -> Option<DiskUsage> {
        let disk = self.inner.disk.clone()?;
        match self.inner.runtime.spawn_blocking(move || disk.usage()).await {
            Ok(Ok(usage)) => Some(usage),
            Ok(Err(e)) => {
                tracing::warn!("Failed to measure asset cache directory: {}", e);
                None
            }
            Err(e) => {
                tracing::error!("Disk usage task failed: {}", e);
                None
            }
        }
    }

    /// File that holds (or would hold) `id`, `None` when memory-only
    pub fn path_for(&self, id: &str) -> Option<PathBuf> {
        self.inner.disk.as_ref().map(|disk| disk.path_for(id))
    }

    pub fn is_disk_enabled(&self) -> bool {
        self.inner.disk.is_some()
    }

    pub fn config(&self) -> &AssetCacheConfig {
        &self.inner.config
    }
}
