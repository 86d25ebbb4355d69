//! Lookups: memory, then disk, optionally waiting on an in-flight write

use crate::errors::DiskReadError;
use assetcache_core::Asset;
use std::sync::Arc;

use crate::core::types::AssetCache;

impl AssetCache {
    /// Look up an asset by id
    ///
    /// Consults memory first, then disk; a disk hit is promoted into memory.
    /// Returns `None` on a miss. Disk errors are logged and treated as a miss.
    ///
    /// When waiting on in-progress writes is enabled and the asset's file is
    /// being written, the lookup waits up to the configured timeout for that
    /// write and retries the disk read once, whether or not the wait timed
    /// out. Every call counts as a request, including one for an empty id.
    pub async fn get(&self, id: &str) -> Option<Arc<Asset>> {
        let requests = self.inner.stats.record_request();
        let found = if id.is_empty() {
            None
        } else {
            self.lookup(id).await
        };
        self.report_hit_rate(requests);
        found
    }

    async fn lookup(&self, id: &str) -> Option<Arc<Asset>> {
        if let Some(asset) = self.inner.memory.try_get(id) {
            self.inner.stats.record_memory_hit();
            return Some(asset);
        }

        let path = self.path_for(id)?;

        if let Some(asset) = self.read_from_disk(id).await {
            return Some(self.promote(id, asset));
        }

        if !self.inner.writes.is_writing(&path) {
            return None;
        }
        self.inner.stats.record_inprogress();

        let timeout = self.inner.config.wait_timeout()?;
        let finished = self.inner.writes.wait_for_write(&path, timeout).await;
        if !finished && self.inner.activity_enabled() {
            tracing::debug!("Gave up waiting {:?} for write of asset {}", timeout, id);
        }

        let asset = self.read_from_disk(id).await?;
        Some(self.promote(id, asset))
    }

    fn promote(&self, id: &str, asset: Asset) -> Arc<Asset> {
        self.inner.stats.record_disk_hit();
        let asset = Arc::new(asset);
        self.inner.memory.put(id, Arc::clone(&asset));
        asset
    }

    async fn read_from_disk(&self, id: &str) -> Option<Asset> {
        let disk = self.inner.disk.clone()?;
        let key = id.to_string();

        let result = match self
            .inner
            .runtime
            .spawn_blocking(move || disk.read(&key))
            .await
        {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Disk read task for asset {} failed: {}", id, e);
                return None;
            }
        };

        match result {
            Ok(asset) => {
                if self.inner.activity_enabled() {
                    tracing::debug!("Read asset {} from disk", id);
                }
                Some(asset)
            }
            Err(DiskReadError::NotFound) => None,
            Err(DiskReadError::Corrupt { path, reason }) => {
                self.inner.stats.record_corrupt();
                tracing::warn!(
                    "Removed corrupt cache file {} for asset {}: {}",
                    path.display(),
                    id,
                    reason
                );
                None
            }
            Err(e) => {
                tracing::warn!("Failed to read asset {} from disk: {}", id, e);
                None
            }
        }
    }

    fn report_hit_rate(&self, requests: u64) {
        let every = self.inner.config.hit_rate_display;
        if every == 0 || requests % every != 0 || !self.inner.reports_enabled() {
            return;
        }

        let stats = self.statistics();
        tracing::info!(
            "Asset cache hit rate: {}",
            stats.hit_rate_summary(self.inner.memory.is_enabled())
        );
    }
}
