//! Two-tier asset cache
//!
//! An asset cache that sits in front of a slow, authoritative asset store:
//! - Memory tier: concurrent map with absolute time-based expiry
//! - Disk tier: one file per asset in a sharded directory tree, expired by
//!   last-access time through a background sweep
//! - Write-behind: stores update memory synchronously and persist to disk on
//!   the blocking pool, with single-flight per target file
//!
//! The cache never talks to the backing store itself. Hosts call
//! [`AssetCache::get`] first and, on a miss, fetch from the store and hand the
//! result to [`AssetCache::put`].

pub mod core;
pub mod disk;
pub mod errors;
pub mod inflight;
pub mod memory;
pub mod paths;
pub mod stats;

pub use crate::core::AssetCache;
pub use assetcache_config::AssetCacheConfig;
pub use assetcache_core::Asset;
pub use disk::{DiskTier, DiskUsage, SweepReport};
pub use errors::DiskReadError;
pub use inflight::{InFlightWrites, WriteGuard};
pub use memory::MemoryTier;
pub use paths::map_to_path;
pub use stats::CacheStatistics;
