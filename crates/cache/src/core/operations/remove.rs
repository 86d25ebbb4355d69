//! Explicit expiry of a single asset

use crate::core::types::AssetCache;

impl AssetCache {
    /// Remove an asset from both tiers
    ///
    /// Returns whether either tier held it. Disk errors are logged. A write
    /// of the asset still in flight is cancelled, so its file is deleted
    /// once the write lands instead of reappearing on disk.
    pub async fn expire(&self, id: &str) -> bool {
        if self.inner.activity_enabled() {
            tracing::debug!("Expiring asset {}", id);
        }

        let mut removed = self.inner.memory.remove(id);

        if let Some(disk) = self.inner.disk.clone() {
            removed |= self.inner.writes.cancel(&disk.path_for(id));
            let key = id.to_string();
            match self
                .inner
                .runtime
                .spawn_blocking(move || disk.delete(&key))
                .await
            {
                Ok(Ok(deleted)) => removed |= deleted,
                Ok(Err(e)) => tracing::warn!("Failed to expire asset {} from disk: {}", id, e),
                Err(e) => tracing::error!("Disk expiry task for asset {} failed: {}", id, e),
            }
        }

        if removed {
            self.inner.stats.record_expiration();
        }
        removed
    }
}
