//! Disk sweep, on demand and in the background

use crate::disk::SweepReport;
use std::sync::{Arc, Weak};
use tokio::time::{Instant, MissedTickBehavior};

use super::types::{AssetCache, CacheInner};

/// Start the periodic sweep task
///
/// Does nothing when either the file timeout or the sweep interval is
/// disabled, or when there is no disk tier. The task only holds a weak
/// reference so dropping the last cache handle ends it.
pub(super) fn start_sweep_task(cache: &AssetCache) {
    let inner = &cache.inner;
    if inner.disk.is_none() {
        return;
    }
    let (Some(_), Some(period)) = (
        inner.config.file_expiration(),
        inner.config.cleanup_interval(),
    ) else {
        return;
    };

    // Scheduled from construction, not from when the task is first polled
    let _runtime = inner.runtime.enter();
    let mut interval = match Instant::now().checked_add(period) {
        Some(start) => tokio::time::interval_at(start, period),
        None => {
            tracing::warn!("Sweep interval {:?} is too large, background sweep disabled", period);
            return;
        }
    };
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let weak: Weak<CacheInner> = Arc::downgrade(inner);
    let handle = inner.runtime.spawn(async move {
        loop {
            interval.tick().await;
            let Some(inner) = weak.upgrade() else {
                break;
            };
            run_sweep(inner).await;
        }
    });

    *inner.sweep_handle.lock() = Some(handle);
}

/// One sweep pass: purge expired memory entries, then idle disk files
async fn run_sweep(inner: Arc<CacheInner>) -> SweepReport {
    let purged = inner.memory.purge_expired();

    let (Some(disk), Some(max_age)) = (inner.disk.clone(), inner.config.file_expiration()) else {
        return SweepReport::default();
    };

    if inner.activity_enabled() {
        tracing::debug!(
            "Sweeping {} for files idle longer than {:?}",
            disk.root().display(),
            max_age
        );
    }

    let report = match inner
        .runtime
        .spawn_blocking(move || disk.sweep(max_age))
        .await
    {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Asset cache sweep task failed: {}", e);
            return SweepReport::default();
        }
    };

    inner.stats.record_sweep(report.removed);

    if report.failed > 0 {
        tracing::warn!(
            "Asset cache sweep could not process {} entries",
            report.failed
        );
    }
    if inner.activity_enabled() {
        tracing::debug!(
            "Sweep done: {} shards, {} files scanned, {} removed, {} memory entries purged",
            report.shards,
            report.scanned,
            report.removed,
            purged
        );
    }

    report
}

impl AssetCache {
    /// Run one sweep now with the configured file timeout
    ///
    /// Also purges expired memory entries. Returns an empty report when the
    /// cache is memory-only or files never expire.
    pub async fn sweep(&self) -> SweepReport {
        run_sweep(Arc::clone(&self.inner)).await
    }

    /// Whether the periodic sweep task is running
    pub fn is_sweeping(&self) -> bool {
        self.inner
            .sweep_handle
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub(super) fn stop_sweep_task(&self) {
        if let Some(handle) = self.inner.sweep_handle.lock().take() {
            handle.abort();
        }
    }
}
