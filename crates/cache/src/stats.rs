//! Cache counters and statistics snapshots

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

/// Internal cache statistics with atomic counters
#[derive(Debug)]
pub struct CacheStats {
    pub requests: AtomicU64,
    pub memory_hits: AtomicU64,
    pub disk_hits: AtomicU64,
    /// Misses that happened while a write of the same file was in flight
    pub inprogress_requests: AtomicU64,
    pub writes: AtomicU64,
    pub write_failures: AtomicU64,
    /// Stores dropped because the file was already being written
    pub writes_skipped: AtomicU64,
    pub touches: AtomicU64,
    pub corrupt_removed: AtomicU64,
    pub expirations: AtomicU64,
    pub sweeps: AtomicU64,
    pub swept_files: AtomicU64,
    pub stats_since: SystemTime,
}

impl Default for CacheStats {
    fn default() -> Self {
        Self {
            requests: AtomicU64::new(0),
            memory_hits: AtomicU64::new(0),
            disk_hits: AtomicU64::new(0),
            inprogress_requests: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
            writes_skipped: AtomicU64::new(0),
            touches: AtomicU64::new(0),
            corrupt_removed: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
            sweeps: AtomicU64::new(0),
            swept_files: AtomicU64::new(0),
            stats_since: SystemTime::now(),
        }
    }
}

impl CacheStats {
    /// Count a lookup, returning the running total
    pub fn record_request(&self) -> u64 {
        self.requests.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn record_memory_hit(&self) {
        self.memory_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_disk_hit(&self) {
        self.disk_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_inprogress(&self) {
        self.inprogress_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write_failure(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write_skipped(&self) {
        self.writes_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_touch(&self) {
        self.touches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_corrupt(&self) {
        self.corrupt_removed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_expiration(&self) {
        self.expirations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sweep(&self, removed: usize) {
        self.sweeps.fetch_add(1, Ordering::Relaxed);
        self.swept_files.fetch_add(removed as u64, Ordering::Relaxed);
    }

    /// Point-in-time copy of the counters
    pub fn snapshot(&self, memory_entries: usize, writes_in_flight: usize) -> CacheStatistics {
        CacheStatistics {
            requests: self.requests.load(Ordering::Relaxed),
            memory_hits: self.memory_hits.load(Ordering::Relaxed),
            disk_hits: self.disk_hits.load(Ordering::Relaxed),
            inprogress_requests: self.inprogress_requests.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            writes_skipped: self.writes_skipped.load(Ordering::Relaxed),
            touches: self.touches.load(Ordering::Relaxed),
            corrupt_removed: self.corrupt_removed.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            sweeps: self.sweeps.load(Ordering::Relaxed),
            swept_files: self.swept_files.load(Ordering::Relaxed),
            memory_entries,
            writes_in_flight,
            stats_since: self.stats_since,
        }
    }
}

/// Snapshot of cache activity since construction
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStatistics {
    pub requests: u64,
    pub memory_hits: u64,
    pub disk_hits: u64,
    pub inprogress_requests: u64,
    pub writes: u64,
    pub write_failures: u64,
    pub writes_skipped: u64,
    pub touches: u64,
    pub corrupt_removed: u64,
    pub expirations: u64,
    pub sweeps: u64,
    pub swept_files: u64,
    pub memory_entries: usize,
    pub writes_in_flight: usize,
    pub stats_since: SystemTime,
}

impl CacheStatistics {
    /// Memory hits as a percentage of requests
    pub fn memory_hit_rate(&self) -> f64 {
        percentage(self.memory_hits, self.requests)
    }

    /// Disk hits as a percentage of requests
    pub fn disk_hit_rate(&self) -> f64 {
        percentage(self.disk_hits, self.requests)
    }

    /// One-line hit rate report; the memory part is left out when
    /// `include_memory` is false
    pub fn hit_rate_summary(&self, include_memory: bool) -> String {
        let file = format!(
            "file {:.1}% ({}/{})",
            self.disk_hit_rate(),
            self.disk_hits,
            self.requests
        );
        let memory = if include_memory {
            format!(
                ", memory {:.1}% ({}/{})",
                self.memory_hit_rate(),
                self.memory_hits,
                self.requests
            )
        } else {
            String::new()
        };
        format!(
            "{file}{memory}, {} requests for in-progress writes",
            self.inprogress_requests
        )
    }

    pub fn misses(&self) -> u64 {
        self.requests
            .saturating_sub(self.memory_hits)
            .saturating_sub(self.disk_hits)
    }
}

fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_counter_returns_running_total() {
        let stats = CacheStats::default();
        assert_eq!(stats.record_request(), 1);
        assert_eq!(stats.record_request(), 2);
    }

    #[test]
    fn test_hit_rates() {
        let stats = CacheStats::default();
        for _ in 0..4 {
            stats.record_request();
        }
        stats.record_memory_hit();
        stats.record_disk_hit();
        stats.record_disk_hit();

        let snapshot = stats.snapshot(3, 0);
        assert_eq!(snapshot.memory_hit_rate(), 25.0);
        assert_eq!(snapshot.disk_hit_rate(), 50.0);
        assert_eq!(snapshot.misses(), 1);
        assert_eq!(snapshot.memory_entries, 3);
    }

    #[test]
    fn test_hit_rate_summary_omits_disabled_memory_tier() {
        let stats = CacheStats::default();
        stats.record_request();
        stats.record_request();
        stats.record_disk_hit();
        stats.record_inprogress();
        let snapshot = stats.snapshot(0, 0);

        assert_eq!(
            snapshot.hit_rate_summary(true),
            "file 50.0% (1/2), memory 0.0% (0/2), 1 requests for in-progress writes"
        );
        assert_eq!(
            snapshot.hit_rate_summary(false),
            "file 50.0% (1/2), 1 requests for in-progress writes"
        );
    }

    #[test]
    fn test_empty_rates_are_zero() {
        let snapshot = CacheStats::default().snapshot(0, 0);
        assert_eq!(snapshot.memory_hit_rate(), 0.0);
        assert_eq!(snapshot.disk_hit_rate(), 0.0);
    }

    #[test]
    fn test_sweep_accumulates() {
        let stats = CacheStats::default();
        stats.record_sweep(3);
        stats.record_sweep(0);
        let snapshot = stats.snapshot(0, 0);
        assert_eq!(snapshot.sweeps, 2);
        assert_eq!(snapshot.swept_files, 3);
    }
}
