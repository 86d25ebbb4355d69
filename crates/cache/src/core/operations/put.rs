//! Stores: memory update plus write-behind to disk

use assetcache_core::Asset;
use std::sync::Arc;

use crate::core::types::AssetCache;

impl AssetCache {
    /// Store an asset
    ///
    /// Returns immediately. Memory is updated before returning; the disk
    /// copy is written on the blocking pool. If the file already exists its
    /// access time is refreshed instead of rewriting it, and if a write of
    /// the same file is already in flight the request is dropped. Assets
    /// with an empty id are ignored.
    pub fn cache(&self, asset: impl Into<Arc<Asset>>) {
        let asset = asset.into();
        if asset.is_empty() {
            tracing::debug!("Ignoring asset with empty id");
            return;
        }

        self.inner.memory.put(&asset.id, Arc::clone(&asset));

        let Some(disk) = self.inner.disk.as_ref() else {
            return;
        };

        if self.refresh_existing(&asset.id) {
            return;
        }

        let path = disk.path_for(&asset.id);
        let Some(guard) = self.inner.writes.try_begin_write(&path) else {
            self.inner.stats.record_write_skipped();
            if self.inner.activity_enabled() {
                tracing::debug!("Asset {} is already being written", asset.id);
            }
            return;
        };

        // A write may have completed between the existence check and the claim
        if self.refresh_existing(&asset.id) {
            return;
        }

        let inner = Arc::clone(&self.inner);
        let disk = disk.clone();
        let id = asset.id.clone();
        let write = self.inner.runtime.spawn_blocking(move || {
            match disk.write(&asset) {
                // Expired while the write was in flight
                Ok(path) if guard.is_cancelled() => {
                    if let Err(e) = disk.delete(&asset.id) {
                        tracing::warn!("Failed to drop expired asset {} after write: {}", asset.id, e);
                    } else if inner.activity_enabled() {
                        tracing::debug!("Discarded {} for expired asset {}", path.display(), asset.id);
                    }
                }
                Ok(path) => {
                    inner.stats.record_write();
                    if inner.activity_enabled() {
                        tracing::debug!("Cached asset {} to {}", asset.id, path.display());
                    }
                }
                Err(e) => {
                    inner.stats.record_write_failure();
                    tracing::error!("Failed to cache asset {} to disk: {}", asset.id, e);
                }
            }
        });

        self.inner.runtime.spawn(async move {
            if let Err(e) = write.await {
                tracing::error!("Background write of asset {} did not complete: {}", id, e);
            }
        });
    }

    /// Alias of [`AssetCache::cache`]
    pub fn put(&self, asset: impl Into<Arc<Asset>>) {
        self.cache(asset)
    }

    /// Touch the file for `id` if it exists; returns whether it did
    fn refresh_existing(&self, id: &str) -> bool {
        let Some(disk) = self.inner.disk.as_ref() else {
            return false;
        };
        if !disk.exists(id) {
            return false;
        }

        match disk.touch(id) {
            Ok(true) => {
                self.inner.stats.record_touch();
                true
            }
            // Swept between the check and the touch
            Ok(false) => false,
            Err(e) => {
                tracing::warn!("Failed to refresh cache file for asset {}: {}", id, e);
                true
            }
        }
    }
}
