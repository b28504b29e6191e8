//! Seams between the engine and its collaborators.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::DomainResult;
use crate::extraction::MultiObjectResult;
use crate::model::{Mrid, NetworkObject, UnresolvedReference};

/// In-memory registry of entities keyed by identifier.
///
/// Implementations must be thread-safe (Send + Sync); the engine itself only
/// uses a store from one logical call at a time.
pub trait LocalStore: Send + Sync {
    /// Looks an object up by identifier.
    fn get(&self, mrid: &Mrid) -> Option<Arc<NetworkObject>>;

    /// Adds an object.
    ///
    /// Returns `Ok(false)` and keeps the stored instance when the identifier
    /// is already present. Declared references are wired or recorded as
    /// unresolved, and references waiting on this identifier are drained.
    fn add(&self, object: Arc<NetworkObject>) -> DomainResult<bool>;

    /// Outstanding references made by `mrid`.
    fn unresolved_references_from(&self, mrid: &Mrid) -> Vec<UnresolvedReference>;

    /// Outstanding references waiting on `mrid`.
    fn unresolved_references_to(&self, mrid: &Mrid) -> Vec<UnresolvedReference>;

    /// Total number of outstanding references.
    fn num_unresolved_references(&self) -> usize;

    /// Number of stored objects.
    fn len(&self) -> usize;

    fn contains(&self, mrid: &Mrid) -> bool {
        self.get(mrid).is_some()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fetches identified objects by identifier, batching as needed.
#[async_trait]
pub trait ObjectFetcher: Send + Sync {
    /// Fetches the given identifiers.
    ///
    /// Every identifier ends up in exactly one of `objects` or `failed`.
    async fn fetch_objects(&self, mrids: Vec<Mrid>) -> DomainResult<MultiObjectResult>;
}
