//! Result aggregation for multi-object fetches.
//!
//! Every response item is turned into an [`ExtractResult`] by decoding it and
//! registering it in the local store through [`get_or_add`], the single
//! choke point that guarantees at-most-once materialization per identifier.
//! [`handle_multi_object`] then folds the item stream into a
//! [`MultiObjectResult`].

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use futures::stream::{Stream, StreamExt};
use tracing::warn;

use crate::error::DomainResult;
use crate::model::{EntityType, Mrid, NetworkObject, WireObject};
use crate::resolver::LocalStore;

/// Per-response-item outcome of decode and insert.
///
/// `object` is `None` iff decoding or insertion failed for `mrid`.
#[derive(Debug, Clone)]
pub struct ExtractResult {
    pub mrid: Mrid,
    pub object: Option<Arc<NetworkObject>>,
}

impl ExtractResult {
    pub fn resolved(object: Arc<NetworkObject>) -> Self {
        Self {
            mrid: object.mrid().clone(),
            object: Some(object),
        }
    }

    pub fn failed(mrid: Mrid) -> Self {
        Self { mrid, object: None }
    }
}

/// Outcome of a multi-identifier fetch.
///
/// `objects` and `failed` are always disjoint.
#[derive(Debug, Clone, Default)]
pub struct MultiObjectResult {
    pub objects: BTreeMap<Mrid, Arc<NetworkObject>>,
    pub failed: BTreeSet<Mrid>,
}

impl MultiObjectResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the failure set with every requested identifier.
    pub fn expecting<'a, I>(requested: I) -> Self
    where
        I: IntoIterator<Item = &'a Mrid>,
    {
        Self {
            objects: BTreeMap::new(),
            failed: requested.into_iter().cloned().collect(),
        }
    }

    /// Records a resolved object, clearing any failure for its identifier.
    pub fn insert(&mut self, object: Arc<NetworkObject>) {
        self.failed.remove(object.mrid());
        self.objects.insert(object.mrid().clone(), object);
    }

    /// Records a failure unless the identifier already resolved.
    pub fn mark_failed(&mut self, mrid: Mrid) {
        if !self.objects.contains_key(&mrid) {
            self.failed.insert(mrid);
        }
    }

    /// Folds one extraction outcome into the result.
    pub fn record(&mut self, extracted: ExtractResult) {
        match extracted.object {
            Some(object) => self.insert(object),
            None => self.mark_failed(extracted.mrid),
        }
    }

    /// Merges another result into this one, keeping the sets disjoint.
    pub fn merge(&mut self, other: MultiObjectResult) {
        for object in other.objects.into_values() {
            self.insert(object);
        }
        for mrid in other.failed {
            self.mark_failed(mrid);
        }
    }

    pub fn get(&self, mrid: &Mrid) -> Option<&Arc<NetworkObject>> {
        self.objects.get(mrid)
    }

    pub fn contains(&self, mrid: &Mrid) -> bool {
        self.objects.contains_key(mrid)
    }

    /// Number of resolved objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Resolved objects of a given type.
    pub fn objects_of_type(
        &self,
        entity_type: EntityType,
    ) -> impl Iterator<Item = &Arc<NetworkObject>> + '_ {
        self.objects
            .values()
            .filter(move |object| object.entity_type() == entity_type)
    }
}

/// Returns the stored object for `mrid`, or decodes and stores a new one.
///
/// An identifier is never decoded twice once it is in the store, and an
/// object already stored is never replaced.
pub fn get_or_add<S, F>(store: &S, mrid: &Mrid, decode: F) -> DomainResult<Arc<NetworkObject>>
where
    S: LocalStore + ?Sized,
    F: FnOnce() -> DomainResult<NetworkObject>,
{
    if let Some(existing) = store.get(mrid) {
        return Ok(existing);
    }

    let object = Arc::new(decode()?);
    if store.add(Arc::clone(&object))? {
        return Ok(object);
    }

    // Lost a race with another insert; the first instance wins.
    Ok(store.get(mrid).unwrap_or(object))
}

/// Decodes a wire object and registers it in the store.
///
/// Decode and insert failures are per-item: they produce a failed
/// [`ExtractResult`] rather than an error.
pub fn extract<S>(store: &S, wire: WireObject) -> ExtractResult
where
    S: LocalStore + ?Sized,
{
    let mrid = wire.mrid.clone();
    match get_or_add(store, &mrid, || NetworkObject::try_from(wire)) {
        Ok(object) => ExtractResult::resolved(object),
        Err(error) => {
            warn!(mrid = %mrid, error = %error, "failed to extract object");
            ExtractResult::failed(mrid)
        }
    }
}

/// Folds a stream of extraction outcomes into a [`MultiObjectResult`].
///
/// When `requested` is supplied every requested identifier starts out in the
/// failure set, so identifiers the producer never returns are still reported.
/// The first stream error aborts the fold and is returned; no partial result
/// escapes.
pub async fn handle_multi_object<St>(
    requested: Option<&[Mrid]>,
    results: St,
) -> DomainResult<MultiObjectResult>
where
    St: Stream<Item = DomainResult<ExtractResult>>,
{
    let mut result = match requested {
        Some(requested) => MultiObjectResult::expecting(requested),
        None => MultiObjectResult::new(),
    };

    futures::pin_mut!(results);
    while let Some(extracted) = results.next().await {
        result.record(extracted?);
    }

    Ok(result)
}
