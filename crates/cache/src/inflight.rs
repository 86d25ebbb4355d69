//! Single-flight tracking of in-progress disk writes
//!
//! Presence of a path in the tracker means some task owns the write of that
//! file. Claiming is a check-and-set under one mutex, so two writers can
//! never both observe "not present" and proceed. Ownership is represented by
//! a [`WriteGuard`]; dropping it releases the claim even if the write
//! returned an error or panicked. A claim can be cancelled while held, which
//! tells the writer its result is no longer wanted.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

#[derive(Default)]
struct Claim {
    /// Wakes readers waiting on this write
    notify: Notify,
    cancelled: AtomicBool,
}

struct Inner {
    writing: Mutex<HashMap<PathBuf, Arc<Claim>>>,
    /// Signalled whenever the map becomes empty
    idle: Notify,
}

/// Set of files currently being written
#[derive(Clone)]
pub struct InFlightWrites {
    inner: Arc<Inner>,
}

impl Default for InFlightWrites {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InFlightWrites {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InFlightWrites")
            .field("in_flight", &self.len())
            .finish()
    }
}

impl InFlightWrites {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                writing: Mutex::new(HashMap::new()),
                idle: Notify::new(),
            }),
        }
    }

    /// Claim the write of `path`
    ///
    /// Returns `None` when another task already owns it.
    pub fn try_begin_write(&self, path: &Path) -> Option<WriteGuard> {
        let mut writing = self.inner.writing.lock();
        if writing.contains_key(path) {
            return None;
        }

        let claim = Arc::new(Claim::default());
        writing.insert(path.to_path_buf(), Arc::clone(&claim));
        Some(WriteGuard {
            tracker: self.clone(),
            path: path.to_path_buf(),
            claim,
        })
    }

    /// Release the claim on `path`, waking any waiters
    ///
    /// Safe to call any number of times; returns whether a claim was removed.
    pub fn end_write(&self, path: &Path) -> bool {
        let removed = {
            let mut writing = self.inner.writing.lock();
            writing.remove(path).map(|claim| (claim, writing.is_empty()))
        };

        match removed {
            Some((claim, now_idle)) => {
                claim.notify.notify_waiters();
                if now_idle {
                    self.inner.idle.notify_waiters();
                }
                true
            }
            None => false,
        }
    }

    /// Mark the in-flight write of `path` as unwanted
    ///
    /// The claim stays held; its owner sees [`WriteGuard::is_cancelled`].
    /// Returns whether a write was in flight.
    pub fn cancel(&self, path: &Path) -> bool {
        match self.inner.writing.lock().get(path) {
            Some(claim) => {
                claim.cancelled.store(true, Ordering::SeqCst);
                true
            }
            None => false,
        }
    }

    /// Release `path` only if it is still owned through `claim`
    fn release(&self, path: &Path, claim: &Arc<Claim>) {
        let now_idle = {
            let mut writing = self.inner.writing.lock();
            match writing.get(path) {
                Some(current) if Arc::ptr_eq(current, claim) => {
                    writing.remove(path);
                    Some(writing.is_empty())
                }
                _ => None,
            }
        };

        if let Some(now_idle) = now_idle {
            claim.notify.notify_waiters();
            if now_idle {
                self.inner.idle.notify_waiters();
            }
        }
    }

    pub fn is_writing(&self, path: &Path) -> bool {
        self.inner.writing.lock().contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.inner.writing.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.writing.lock().is_empty()
    }

    /// Wait up to `timeout` for the in-flight write of `path` to finish
    ///
    /// Returns `true` when no write is in flight (any more) and `false` if
    /// the timeout elapsed first.
    pub async fn wait_for_write(&self, path: &Path, timeout: Duration) -> bool {
        let claim = match self.inner.writing.lock().get(path) {
            Some(claim) => Arc::clone(claim),
            None => return true,
        };

        let notified = claim.notify.notified();
        tokio::pin!(notified);
        // Register before re-checking so a release in between is not missed
        notified.as_mut().enable();

        match self.inner.writing.lock().get(path) {
            Some(current) if Arc::ptr_eq(current, &claim) => {}
            _ => return true,
        }

        tokio::time::timeout(timeout, notified).await.is_ok()
    }

    /// Wait up to `timeout` until no writes are in flight
    pub async fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_empty() {
                return true;
            }

            match deadline {
                Some(deadline) => {
                    if tokio::time::timeout_at(deadline, notified).await.is_err() {
                        return self.is_empty();
                    }
                }
                None => notified.await,
            }
        }
    }
}

/// Ownership of one in-flight write
///
/// Dropping the guard ends the write.
#[must_use = "dropping the guard immediately releases the write claim"]
pub struct WriteGuard {
    tracker: InFlightWrites,
    path: PathBuf,
    claim: Arc<Claim>,
}

impl WriteGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the write was cancelled after it was claimed
    pub fn is_cancelled(&self) -> bool {
        self.claim.cancelled.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for WriteGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteGuard").field("path", &self.path).finish()
    }
}

impl Drop for WriteGuard {
    fn drop(&mut self) {
        self.tracker.release(&self.path, &self.claim);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_claim_is_rejected() {
        let writes = InFlightWrites::new();
        let path = Path::new("/cache/1234/deadbeef-1234");

        let guard = writes.try_begin_write(path).unwrap();
        assert!(writes.is_writing(path));
        assert!(writes.try_begin_write(path).is_none());

        drop(guard);
        assert!(!writes.is_writing(path));
        assert!(writes.try_begin_write(path).is_some());
    }

    #[test]
    fn test_different_paths_are_independent() {
        let writes = InFlightWrites::new();
        let a = writes.try_begin_write(Path::new("/c/aaaa/aaaa")).unwrap();
        let b = writes.try_begin_write(Path::new("/c/bbbb/bbbb")).unwrap();
        assert_eq!(writes.len(), 2);
        drop(a);
        drop(b);
        assert!(writes.is_empty());
    }

    #[test]
    fn test_end_write_is_idempotent() {
        let writes = InFlightWrites::new();
        let path = Path::new("/c/abcd/abcd");
        let guard = writes.try_begin_write(path).unwrap();

        assert!(writes.end_write(path));
        assert!(!writes.end_write(path));

        // A stale guard must not release a newer claim
        let newer = writes.try_begin_write(path).unwrap();
        drop(guard);
        assert!(writes.is_writing(path));
        drop(newer);
        assert!(!writes.is_writing(path));
    }

    #[test]
    fn test_cancel_flags_current_claim_only() {
        let writes = InFlightWrites::new();
        let path = Path::new("/c/abcd/abcd");
        assert!(!writes.cancel(path));

        let guard = writes.try_begin_write(path).unwrap();
        assert!(!guard.is_cancelled());
        assert!(writes.cancel(path));
        assert!(guard.is_cancelled());
        assert!(writes.is_writing(path));

        drop(guard);
        let next = writes.try_begin_write(path).unwrap();
        assert!(!next.is_cancelled());
    }

    #[test]
    fn test_guard_released_on_panic() {
        let writes = InFlightWrites::new();
        let path = PathBuf::from("/c/0000/0000");

        let tracker = writes.clone();
        let claimed = path.clone();
        let result = std::thread::spawn(move || {
            let _guard = tracker.try_begin_write(&claimed).unwrap();
            panic!("serialization blew up");
        })
        .join();

        assert!(result.is_err());
        assert!(!writes.is_writing(&path));
    }

    #[test]
    fn test_concurrent_claims_single_winner() {
        let writes = InFlightWrites::new();
        let path = PathBuf::from("/c/beef/deadbeef");
        let barrier = Arc::new(std::sync::Barrier::new(16));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let writes = writes.clone();
                let path = path.clone();
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    writes.try_begin_write(&path)
                })
            })
            .collect();

        let guards: Vec<_> = handles
            .into_iter()
            .filter_map(|h| h.join().unwrap())
            .collect();
        assert_eq!(guards.len(), 1);
    }

    #[tokio::test]
    async fn test_wait_for_write_wakes_on_release() {
        let writes = InFlightWrites::new();
        let path = PathBuf::from("/c/1234/abcd1234");
        let guard = writes.try_begin_write(&path).unwrap();

        let releaser = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            drop(guard);
        });

        assert!(writes.wait_for_write(&path, Duration::from_secs(5)).await);
        releaser.await.unwrap();
    }

    #[tokio::test]
    async fn test_wait_for_write_without_claim_returns_immediately() {
        let writes = InFlightWrites::new();
        assert!(
            writes
                .wait_for_write(Path::new("/c/none/none"), Duration::from_secs(5))
                .await
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_write_times_out() {
        let writes = InFlightWrites::new();
        let path = PathBuf::from("/c/1234/abcd1234");
        let _guard = writes.try_begin_write(&path).unwrap();

        assert!(!writes.wait_for_write(&path, Duration::from_millis(50)).await);
        assert!(writes.is_writing(&path));
    }

    #[tokio::test]
    async fn test_wait_idle() {
        let writes = InFlightWrites::new();
        assert!(writes.wait_idle(Duration::from_millis(10)).await);

        let first = writes.try_begin_write(Path::new("/c/aaaa/aaaa")).unwrap();
        let second = writes.try_begin_write(Path::new("/c/bbbb/bbbb")).unwrap();

        let releaser = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            drop(first);
            tokio::time::sleep(Duration::from_millis(10)).await;
            drop(second);
        });

        assert!(writes.wait_idle(Duration::from_secs(5)).await);
        assert!(writes.is_empty());
        releaser.await.unwrap();
    }
}
