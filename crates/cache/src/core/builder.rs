//! Cache construction

use crate::disk::DiskTier;
use crate::inflight::InFlightWrites;
use crate::memory::MemoryTier;
use crate::stats::CacheStats;
use assetcache_config::AssetCacheConfig;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::runtime::Handle;

use super::cleanup::start_sweep_task;
use super::types::{AssetCache, CacheInner};

impl AssetCache {
    /// Create a cache on the current tokio runtime
    ///
    /// Never fails. If the cache directory cannot be created or is not
    /// writable the error is logged and the cache runs memory-only.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub async fn new(config: AssetCacheConfig) -> Self {
        let runtime = Handle::current();
        let root = config.cache_directory.clone();

        let disk = match runtime.spawn_blocking(move || DiskTier::open(root)).await {
            Ok(Ok(disk)) => Some(disk),
            Ok(Err(e)) => {
                tracing::error!("Asset cache directory unusable, running memory-only: {}", e);
                None
            }
            Err(e) => {
                tracing::error!("Opening asset cache directory failed: {}", e);
                None
            }
        };

        Self::assemble(config, disk, runtime)
    }

    /// Create a cache whose background work runs on `runtime`
    ///
    /// For hosts that are not themselves async. Opens the cache directory
    /// on the calling thread.
    pub fn with_runtime(config: AssetCacheConfig, runtime: Handle) -> Self {
        let disk = match DiskTier::open(&config.cache_directory) {
            Ok(disk) => Some(disk),
            Err(e) => {
                tracing::error!("Asset cache directory unusable, running memory-only: {}", e);
                None
            }
        };

        Self::assemble(config, disk, runtime)
    }

    fn assemble(config: AssetCacheConfig, disk: Option<DiskTier>, runtime: Handle) -> Self {
        if let Err(e) = config.validate() {
            tracing::warn!("Asset cache configuration is inconsistent: {}", e);
        }

        let memory = if config.memory_cache_enabled {
            MemoryTier::new(config.memory_expiration())
        } else {
            MemoryTier::disabled()
        };

        if config.log_level >= 2 {
            tracing::debug!(
                "Asset cache ready: root={}, memory={}, memory ttl={:?}, file ttl={:?}, sweep every {:?}",
                config.cache_directory.display(),
                memory.is_enabled(),
                memory.ttl(),
                config.file_expiration(),
                config.cleanup_interval(),
            );
        }

        let inner = Arc::new(CacheInner {
            config,
            memory,
            disk,
            writes: InFlightWrites::new(),
            stats: CacheStats::default(),
            runtime,
            sweep_handle: Mutex::new(None),
        });

        let cache = Self { inner };
        start_sweep_task(&cache);
        cache
    }
}
