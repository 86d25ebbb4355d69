use assetcache_cache::{AssetCache, AssetCacheConfig};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

pub const FLUSH: Duration = Duration::from_secs(10);

/// A cache in its own temporary root, with the background sweep off
pub struct TestCache {
    pub cache: AssetCache,
    pub root: PathBuf,
    _temp_dir: TempDir,
}

impl TestCache {
    pub async fn new() -> Self {
        Self::with(|_| {}).await
    }

    pub async fn with(configure: impl FnOnce(&mut AssetCacheConfig)) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("assets");
        let mut config = AssetCacheConfig::with_directory(&root);
        config.file_cleanup_interval = 0.0;
        configure(&mut config);

        Self {
            cache: AssetCache::new(config).await,
            root,
            _temp_dir: temp_dir,
        }
    }

    /// A second cache over the same root, as after a restart
    pub async fn reopen(&self) -> AssetCache {
        let mut config = self.cache.config().clone();
        config.memory_cache_enabled = false;
        AssetCache::new(config).await
    }
}
