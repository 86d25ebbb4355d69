//! Core cache types and structures

use crate::disk::DiskTier;
use crate::inflight::InFlightWrites;
use crate::memory::MemoryTier;
use crate::stats::CacheStats;
use assetcache_config::AssetCacheConfig;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Two-tier asset cache handle
///
/// Cheap to clone; all clones share the same tiers and counters. The
/// background sweep stops when the last handle is dropped.
#[derive(Clone)]
pub struct AssetCache {
    pub(super) inner: Arc<CacheInner>,
}

pub(super) struct CacheInner {
    pub config: AssetCacheConfig,
    pub memory: MemoryTier,
    /// `None` when the cache root was unusable and the cache runs memory-only
    pub disk: Option<DiskTier>,
    pub writes: InFlightWrites,
    pub stats: CacheStats,
    /// Runtime that owns background writes and the sweep task
    pub runtime: Handle,
    pub sweep_handle: Mutex<Option<JoinHandle<()>>>,
}

impl CacheInner {
    /// Hit-rate reports are enabled
    pub fn reports_enabled(&self) -> bool {
        self.config.log_level >= 1
    }

    /// Per-operation debug events are enabled
    pub fn activity_enabled(&self) -> bool {
        self.config.log_level >= 2
    }
}

impl Drop for CacheInner {
    fn drop(&mut self) {
        if let Some(handle) = self.sweep_handle.lock().take() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for AssetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetCache")
            .field(
                "root",
                &self.inner.disk.as_ref().map(|disk| disk.root().to_path_buf()),
            )
            .field("memory_entries", &self.inner.memory.len())
            .field("writes_in_flight", &self.inner.writes.len())
            .finish()
    }
}
