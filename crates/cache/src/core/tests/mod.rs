
use assetcache_config::AssetCacheConfig;
use std::path::Path;

/// Config rooted at `dir` with the background sweep off
fn test_config(dir: &Path) -> AssetCacheConfig {
    AssetCacheConfig {
        file_cleanup_interval: 0.0,
        log_level: 2,
        ..AssetCacheConfig::with_directory(dir.join("cache"))
    }
}
