use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counters of what a [`SceneMembership`](super::SceneMembership)
/// has pushed to the engine.
///
/// Counters are updated after the engine call returns, while the scene lock
/// is still held, so a snapshot taken under the same lock is exact.
#[derive(Debug, Default)]
pub struct MembershipStats {
    /// Engine add calls that succeeded
    added: AtomicU64,
    /// Engine remove calls that succeeded
    removed: AtomicU64,
    /// Batch and asset-level calls that ran to completion
    batches: AtomicU64,
    /// Calls that returned an error
    failures: AtomicU64,
}

/// Point-in-time copy of [`MembershipStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub added: u64,
    pub removed: u64,
    pub batches: u64,
    pub failures: u64,
}

impl MembershipStats {
    #[inline]
    pub(crate) fn record_added(&self, n: usize) {
        self.added.fetch_add(n as u64, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_removed(&self, n: usize) {
        self.removed.fetch_add(n as u64, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_batch(&self) {
        self.batches.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            added: self.added.load(Ordering::Relaxed),
            removed: self.removed.load(Ordering::Relaxed),
            batches: self.batches.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}
