//! Cache clear operation

use crate::core::types::AssetCache;

impl AssetCache {
    /// Remove every asset from memory and disk
    pub async fn clear(&self) {
        if self.inner.activity_enabled() {
            tracing::debug!("Clearing asset cache");
        }

        self.inner.memory.clear();

        let Some(disk) = self.inner.disk.clone() else {
            return;
        };

        match self
            .inner
            .runtime
            .spawn_blocking(move || disk.clear_all())
            .await
        {
            Ok(Ok(shards)) => {
                if self.inner.activity_enabled() {
                    tracing::debug!("Removed {} shard directories", shards);
                }
            }
            Ok(Err(e)) => tracing::warn!("Failed to clear asset cache directory: {}", e),
            Err(e) => tracing::error!("Cache clear task failed: {}", e),
        }
    }
}
