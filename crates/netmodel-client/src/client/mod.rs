//! The public consumer client.
//!
//! [`NetworkConsumerClient`] owns everything that lives as long as the client:
//! the local store, the hierarchy snapshot, registered error handlers and
//! exchange counters. Every public operation is bounded by the configured
//! request timeout and returns a [`GrpcResult`].
//!
//! One client serves one logical session. Operations may be awaited
//! concurrently, but two first calls racing to populate the hierarchy cache
//! will both fetch it.

mod assembly;
mod fetcher;
mod metrics;

use std::future::Future;
use std::sync::Arc;

use futures::stream::StreamExt;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use netmodel_domain::extraction::get_or_add;
use netmodel_domain::model::HierarchySelection;
use netmodel_domain::resolver::{LocalStore, ReferenceResolver, ResolverConfig};
use netmodel_domain::{
    DomainError, DomainResult, EntityType, HierarchyCache, Mrid, MultiObjectResult,
    NetworkHierarchy, NetworkObject,
};
use netmodel_store::MemoryStore;

pub use fetcher::IdentifiedObjectFetcher;
pub use metrics::{ClientMetrics, ClientMetricsSnapshot};

use crate::config::{ClientConfig, ClientSettings, ConfigLoadError};
use crate::handlers::batch::AwaitableResponses;
use crate::outcome::{ErrorHandler, GrpcResult};
use crate::transport::{status_to_error, NetworkTransport};

const HIERARCHY_OPERATION: &str = "get_network_hierarchy";

/// Consumer client hydrating network subgraphs from a [`NetworkTransport`].
pub struct NetworkConsumerClient<T, S = MemoryStore> {
    transport: Arc<T>,
    store: Arc<S>,
    fetcher: Arc<IdentifiedObjectFetcher<T, S>>,
    resolver: ReferenceResolver<S, IdentifiedObjectFetcher<T, S>>,
    hierarchy: HierarchyCache,
    selection: HierarchySelection,
    settings: ClientSettings,
    error_handlers: Vec<Arc<dyn ErrorHandler>>,
    metrics: Arc<ClientMetrics>,
}

impl<T: NetworkTransport> NetworkConsumerClient<T, MemoryStore> {
    /// Creates a client with default configuration and a fresh store.
    pub fn new(transport: T) -> Self {
        Self::build(
            Arc::new(transport),
            MemoryStore::new_shared(),
            &ClientConfig::default(),
        )
    }

    pub fn with_config(transport: T, config: &ClientConfig) -> Result<Self, ConfigLoadError> {
        Self::with_store(Arc::new(transport), MemoryStore::new_shared(), config)
    }
}

impl<T, S> NetworkConsumerClient<T, S>
where
    T: NetworkTransport,
    S: LocalStore + 'static,
{
    /// Creates a client over an existing transport and store.
    ///
    /// `config` is validated first, so a configuration built in code gets the
    /// same checks as one loaded from a file.
    pub fn with_store(
        transport: Arc<T>,
        store: Arc<S>,
        config: &ClientConfig,
    ) -> Result<Self, ConfigLoadError> {
        config.validate()?;
        Ok(Self::build(transport, store, config))
    }

    fn build(transport: Arc<T>, store: Arc<S>, config: &ClientConfig) -> Self {
        let settings = config.client.clone();
        let metrics = Arc::new(ClientMetrics::default());
        let fetcher = Arc::new(IdentifiedObjectFetcher::new(
            Arc::clone(&transport),
            Arc::clone(&store),
            settings.batch_size,
            settings.response_buffer,
            Arc::clone(&metrics),
        ));
        let resolver = ReferenceResolver::with_config(
            Arc::clone(&store),
            Arc::clone(&fetcher),
            ResolverConfig::default().with_max_passes(settings.max_resolution_passes),
        );

        Self {
            transport,
            store,
            fetcher,
            resolver,
            hierarchy: HierarchyCache::new(),
            selection: config.hierarchy,
            settings,
            error_handlers: Vec::new(),
            metrics,
        }
    }

    /// Registers a handler offered every failure.
    pub fn with_error_handler<H>(mut self, handler: H) -> Self
    where
        H: ErrorHandler + 'static,
    {
        self.error_handlers.push(Arc::new(handler));
        self
    }

    pub fn add_error_handler(&mut self, handler: Arc<dyn ErrorHandler>) {
        self.error_handlers.push(handler);
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn hierarchy_cache(&self) -> &HierarchyCache {
        &self.hierarchy
    }

    /// Snapshot of exchange and hierarchy cache counters.
    pub fn metrics(&self) -> ClientMetricsSnapshot {
        self.metrics.snapshot(self.hierarchy.metrics().snapshot())
    }

    // ========== Identified objects ==========

    /// Fetches one object by identifier.
    #[instrument(skip(self, mrid), fields(mrid = %mrid))]
    pub async fn get_object(&self, mrid: &Mrid) -> GrpcResult<Arc<NetworkObject>> {
        self.run(async {
            let mut result = self.fetcher.identified_objects(vec![mrid.clone()]).await?;
            result
                .objects
                .remove(mrid)
                .ok_or_else(|| DomainError::NotFound { mrid: mrid.clone() })
        })
        .await
    }

    /// Fetches objects by identifier. Unknown identifiers land in `failed`.
    #[instrument(skip(self, mrids), fields(requested = mrids.len()))]
    pub async fn get_objects(&self, mrids: Vec<Mrid>) -> GrpcResult<MultiObjectResult> {
        self.run(self.fetcher.identified_objects(mrids)).await
    }

    // ========== Containers ==========

    /// Assembles one container with its equipment and everything the
    /// equipment references. Fails with not-found if nothing resolved.
    #[instrument(skip(self, mrid), fields(mrid = %mrid, expected = %expected))]
    pub async fn get_container(
        &self,
        mrid: &Mrid,
        expected: EntityType,
    ) -> GrpcResult<MultiObjectResult> {
        self.run(self.get_single_with_references(mrid, expected))
            .await
    }

    /// Assembles several containers of the same type.
    #[instrument(skip(self, mrids), fields(requested = mrids.len(), expected = %expected))]
    pub async fn get_containers(
        &self,
        mrids: Vec<Mrid>,
        expected: EntityType,
    ) -> GrpcResult<MultiObjectResult> {
        self.run(self.get_with_references(&mrids, expected)).await
    }

    /// Fetches the equipment held by a container, without resolution.
    #[instrument(skip(self, mrid), fields(mrid = %mrid))]
    pub async fn get_equipment_for_container(&self, mrid: &Mrid) -> GrpcResult<MultiObjectResult> {
        self.run(self.fetcher.equipment_for_containers(vec![mrid.clone()]))
            .await
    }

    /// Fetches the equipment held by several containers, without resolution.
    #[instrument(skip(self, mrids), fields(requested = mrids.len()))]
    pub async fn get_equipment_for_containers(
        &self,
        mrids: Vec<Mrid>,
    ) -> GrpcResult<MultiObjectResult> {
        self.run(self.fetcher.equipment_for_containers(mrids)).await
    }

    /// Fetches the equipment an operational restriction applies to and
    /// resolves its references.
    #[instrument(skip(self, mrid), fields(mrid = %mrid))]
    pub async fn get_equipment_for_restriction(
        &self,
        mrid: &Mrid,
    ) -> GrpcResult<MultiObjectResult> {
        self.run(async {
            let equipment = self.fetcher.equipment_for_restriction(mrid.clone()).await?;
            self.resolver.resolve(equipment).await
        })
        .await
    }

    /// Assembles a loop: its circuits and substations and their equipment.
    #[instrument(skip(self, mrid), fields(mrid = %mrid))]
    pub async fn get_equipment_for_loop(&self, mrid: &Mrid) -> GrpcResult<MultiObjectResult> {
        self.run(self.get_single_with_references(mrid, EntityType::Loop))
            .await
    }

    /// Assembles every loop in the hierarchy.
    #[instrument(skip(self))]
    pub async fn get_all_loops(&self) -> GrpcResult<MultiObjectResult> {
        self.run(async {
            let hierarchy = self.hierarchy(self.selection).await?;
            let loops: Vec<Mrid> = hierarchy.loops.keys().cloned().collect();
            self.get_with_references(&loops, EntityType::Loop).await
        })
        .await
    }

    /// Assembles every feeder in the hierarchy.
    #[instrument(skip(self))]
    pub async fn retrieve_network(&self) -> GrpcResult<MultiObjectResult> {
        self.run(async {
            let hierarchy = self.hierarchy(self.selection).await?;
            let feeders: Vec<Mrid> = hierarchy.feeders.keys().cloned().collect();
            self.get_with_references(&feeders, EntityType::Feeder).await
        })
        .await
    }

    // ========== Hierarchy and resolution ==========

    /// Returns the network hierarchy, fetching it on first use.
    ///
    /// Once cached, the snapshot is returned whatever `selection` asks for;
    /// [`NetworkHierarchy::selection`] records what it was built with.
    #[instrument(skip(self))]
    pub async fn get_hierarchy(
        &self,
        selection: HierarchySelection,
    ) -> GrpcResult<Arc<NetworkHierarchy>> {
        self.run(self.hierarchy(selection)).await
    }

    /// Fetches every outstanding reference reachable from `seed`.
    #[instrument(skip(self, seed), fields(seed = seed.len()))]
    pub async fn resolve_references(
        &self,
        seed: MultiObjectResult,
    ) -> GrpcResult<MultiObjectResult> {
        self.run(self.resolver.resolve(seed)).await
    }

    // ========== Internals ==========

    /// Applies the request timeout and wraps the outcome.
    async fn run<V, Fut>(&self, operation: Fut) -> GrpcResult<V>
    where
        Fut: Future<Output = DomainResult<V>>,
    {
        let limit = self.settings.request_timeout();
        let result = match timeout(limit, operation).await {
            Ok(result) => result,
            Err(_) => Err(DomainError::Timeout {
                duration_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
            }),
        };
        GrpcResult::of(result, &self.error_handlers)
    }

    pub(crate) async fn hierarchy(
        &self,
        selection: HierarchySelection,
    ) -> DomainResult<Arc<NetworkHierarchy>> {
        self.hierarchy
            .get_or_populate(|| self.fetch_hierarchy(selection))
            .await
    }

    async fn fetch_hierarchy(&self, selection: HierarchySelection) -> DomainResult<NetworkHierarchy> {
        self.metrics.record_exchange();
        let responses = self
            .transport
            .get_network_hierarchy(selection)
            .await
            .map_err(status_to_error)?;

        let mut responses =
            AwaitableResponses::spawn(HIERARCHY_OPERATION, responses, 1).into_stream();
        let response = match responses.next().await {
            Some(response) => response?,
            None => {
                return Err(DomainError::ChannelClosed {
                    operation: HIERARCHY_OPERATION.to_string(),
                })
            }
        };

        let mut hierarchy = NetworkHierarchy::new(selection);
        for wire in response.into_objects() {
            self.metrics.record_object();
            let mrid = wire.mrid.clone();
            let object = get_or_add(self.store.as_ref(), &mrid, || NetworkObject::try_from(wire))?;
            if !hierarchy.insert(object) {
                warn!(mrid = %mrid, "ignoring non-hierarchy object in hierarchy response");
            }
        }

        debug!(objects = hierarchy.len(), "fetched network hierarchy");
        Ok(hierarchy)
    }
}
