//! In-memory tier
//!
//! A concurrent map from asset id to the shared asset record. Entries expire
//! a fixed time after they were inserted or last re-inserted; lookups do not
//! extend their lifetime. Expired entries are dropped lazily on lookup and in
//! bulk by [`MemoryTier::purge_expired`].

use assetcache_core::Asset;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug)]
struct MemoryEntry {
    asset: Arc<Asset>,
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Time-expiring map of hot assets
#[derive(Debug)]
pub struct MemoryTier {
    enabled: bool,
    /// `None` means entries never expire
    ttl: Option<Duration>,
    entries: DashMap<String, MemoryEntry>,
}

impl MemoryTier {
    /// Create a tier whose entries live for `ttl` (`None` = forever)
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            enabled: true,
            ttl,
            entries: DashMap::new(),
        }
    }

    /// A tier that stores nothing and always misses
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ttl: None,
            entries: DashMap::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Look up a live entry
    pub fn try_get(&self, key: &str) -> Option<Arc<Asset>> {
        if !self.enabled {
            return None;
        }

        let now = Instant::now();
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => return Some(Arc::clone(&entry.asset)),
            Some(_) => {}
            None => return None,
        }

        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        None
    }

    /// Insert or replace an entry, restarting its lifetime
    pub fn put(&self, key: &str, asset: Arc<Asset>) {
        if !self.enabled {
            return;
        }

        let expires_at = self.ttl.and_then(|ttl| Instant::now().checked_add(ttl));
        self.entries
            .insert(key.to_string(), MemoryEntry { asset, expires_at });
    }

    /// Drop an entry; returns whether it was present
    pub fn remove(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Remove every expired entry, returning how many were dropped
    pub fn purge_expired(&self) -> usize {
        if self.ttl.is_none() {
            return 0;
        }

        let now = Instant::now();
        let mut purged = 0;
        self.entries.retain(|_, entry| {
            let keep = !entry.is_expired(now);
            if !keep {
                purged += 1;
            }
            keep
        });
        purged
    }

    /// Number of stored entries, including expired ones not yet purged
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
