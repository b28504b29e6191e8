//! Client-lifetime network hierarchy cache.
//!
//! The hierarchy is fetched at most once per client: the first successful
//! population wins and every later read returns that snapshot.
//!
//! # Population
//!
//! Population is guarded by an "is populated" check rather than a lock held
//! across the fetch. Two concurrent first calls may both fetch; the first to
//! finish is kept and the other result is discarded. Concurrent use of one
//! client is not a supported pattern, so this is accepted.
//!
//! # Selection caveat
//!
//! Once populated, the cached snapshot is returned regardless of the
//! [`HierarchySelection`](crate::model::HierarchySelection) a later caller
//! asks for. The snapshot records the selection it was built with.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::DomainResult;
use crate::model::NetworkHierarchy;

/// Counters for hierarchy cache usage.
#[derive(Debug, Default)]
pub struct HierarchyCacheMetrics {
    /// Reads served from the cached snapshot.
    pub hits: AtomicU64,
    /// Reads that had to fetch.
    pub misses: AtomicU64,
}

impl HierarchyCacheMetrics {
    /// Returns a snapshot of the current counters.
    pub fn snapshot(&self) -> HierarchyCacheMetricsSnapshot {
        HierarchyCacheMetricsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of hierarchy cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HierarchyCacheMetricsSnapshot {
    pub hits: u64,
    pub misses: u64,
}

/// Lazily populated, immutable network hierarchy snapshot.
#[derive(Debug, Default)]
pub struct HierarchyCache {
    snapshot: OnceCell<Arc<NetworkHierarchy>>,
    metrics: HierarchyCacheMetrics,
}

impl HierarchyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_populated(&self) -> bool {
        self.snapshot.initialized()
    }

    /// Returns the cached snapshot, if any, without counting a hit or miss.
    pub fn peek(&self) -> Option<Arc<NetworkHierarchy>> {
        self.snapshot.get().cloned()
    }

    /// Stores a snapshot unless one is already cached; returns the cached one.
    pub fn populate(&self, hierarchy: NetworkHierarchy) -> Arc<NetworkHierarchy> {
        let candidate = Arc::new(hierarchy);
        match self.snapshot.set(Arc::clone(&candidate)) {
            Ok(()) => candidate,
            Err(_) => self.snapshot.get().cloned().unwrap_or(candidate),
        }
    }

    /// Returns the cached snapshot, running `fetch` to populate it on first use.
    ///
    /// A failed fetch leaves the cache empty so the next call tries again.
    pub async fn get_or_populate<F, Fut>(&self, fetch: F) -> DomainResult<Arc<NetworkHierarchy>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = DomainResult<NetworkHierarchy>>,
    {
        if let Some(cached) = self.snapshot.get() {
            self.metrics.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(cached));
        }

        self.metrics.misses.fetch_add(1, Ordering::Relaxed);
        let hierarchy = fetch().await?;
        debug!(objects = hierarchy.len(), "populated network hierarchy cache");
        Ok(self.populate(hierarchy))
    }

    pub fn metrics(&self) -> &HierarchyCacheMetrics {
        &self.metrics
    }
}
