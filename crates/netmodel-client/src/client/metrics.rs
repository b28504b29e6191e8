//! Exchange counters.

use std::sync::atomic::{AtomicU64, Ordering};

use netmodel_domain::cache::HierarchyCacheMetricsSnapshot;

/// Counters updated as exchanges run.
#[derive(Debug, Default)]
pub struct ClientMetrics {
    /// Exchanges opened with the transport.
    pub exchanges: AtomicU64,
    /// Identifier batches handed to the transport.
    pub batches_sent: AtomicU64,
    /// Response objects received.
    pub objects_received: AtomicU64,
}

impl ClientMetrics {
    pub(crate) fn record_exchange(&self) {
        self.exchanges.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_batch(&self) {
        self.batches_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_object(&self) {
        self.objects_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a snapshot combined with the hierarchy cache counters.
    pub fn snapshot(&self, hierarchy: HierarchyCacheMetricsSnapshot) -> ClientMetricsSnapshot {
        ClientMetricsSnapshot {
            exchanges: self.exchanges.load(Ordering::Relaxed),
            batches_sent: self.batches_sent.load(Ordering::Relaxed),
            objects_received: self.objects_received.load(Ordering::Relaxed),
            hierarchy_hits: hierarchy.hits,
            hierarchy_misses: hierarchy.misses,
        }
    }
}

/// A point-in-time snapshot of client counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientMetricsSnapshot {
    pub exchanges: u64,
    pub batches_sent: u64,
    pub objects_received: u64,
    pub hierarchy_hits: u64,
    pub hierarchy_misses: u64,
}
