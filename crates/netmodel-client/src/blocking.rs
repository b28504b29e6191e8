//! Blocking facade over [`NetworkConsumerClient`].
//!
//! The facade owns a small multi-threaded runtime. Each call blocks the
//! calling thread while the runtime's worker drives the transport and the
//! response pump, so it must not be used from inside another tokio runtime.

use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};

use netmodel_domain::model::HierarchySelection;
use netmodel_domain::resolver::LocalStore;
use netmodel_domain::{EntityType, Mrid, MultiObjectResult, NetworkHierarchy, NetworkObject};
use netmodel_store::MemoryStore;

use crate::client::{ClientMetricsSnapshot, NetworkConsumerClient};
use crate::outcome::GrpcResult;
use crate::transport::NetworkTransport;

/// Blocking wrapper exposing the same operations as the async client.
pub struct BlockingConsumerClient<T, S = MemoryStore> {
    runtime: Runtime,
    inner: NetworkConsumerClient<T, S>,
}

impl<T, S> BlockingConsumerClient<T, S>
where
    T: NetworkTransport,
    S: LocalStore + 'static,
{
    /// Wraps `inner` with a runtime of one worker thread.
    pub fn new(inner: NetworkConsumerClient<T, S>) -> std::io::Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("netmodel-client")
            .enable_all()
            .build()?;
        Ok(Self { runtime, inner })
    }

    pub fn inner(&self) -> &NetworkConsumerClient<T, S> {
        &self.inner
    }

    pub fn store(&self) -> &Arc<S> {
        self.inner.store()
    }

    pub fn metrics(&self) -> ClientMetricsSnapshot {
        self.inner.metrics()
    }

    pub fn get_object(&self, mrid: &Mrid) -> GrpcResult<Arc<NetworkObject>> {
        self.runtime.block_on(self.inner.get_object(mrid))
    }

    pub fn get_objects(&self, mrids: Vec<Mrid>) -> GrpcResult<MultiObjectResult> {
        self.runtime.block_on(self.inner.get_objects(mrids))
    }

    pub fn get_container(&self, mrid: &Mrid, expected: EntityType) -> GrpcResult<MultiObjectResult> {
        self.runtime.block_on(self.inner.get_container(mrid, expected))
    }

    pub fn get_containers(
        &self,
        mrids: Vec<Mrid>,
        expected: EntityType,
    ) -> GrpcResult<MultiObjectResult> {
        self.runtime
            .block_on(self.inner.get_containers(mrids, expected))
    }

    pub fn get_equipment_for_container(&self, mrid: &Mrid) -> GrpcResult<MultiObjectResult> {
        self.runtime
            .block_on(self.inner.get_equipment_for_container(mrid))
    }

    pub fn get_equipment_for_containers(&self, mrids: Vec<Mrid>) -> GrpcResult<MultiObjectResult> {
        self.runtime
            .block_on(self.inner.get_equipment_for_containers(mrids))
    }

    pub fn get_equipment_for_restriction(&self, mrid: &Mrid) -> GrpcResult<MultiObjectResult> {
        self.runtime
            .block_on(self.inner.get_equipment_for_restriction(mrid))
    }

    pub fn get_equipment_for_loop(&self, mrid: &Mrid) -> GrpcResult<MultiObjectResult> {
        self.runtime
            .block_on(self.inner.get_equipment_for_loop(mrid))
    }

    pub fn get_all_loops(&self) -> GrpcResult<MultiObjectResult> {
        self.runtime.block_on(self.inner.get_all_loops())
    }

    pub fn retrieve_network(&self) -> GrpcResult<MultiObjectResult> {
        self.runtime.block_on(self.inner.retrieve_network())
    }

    pub fn get_hierarchy(&self, selection: HierarchySelection) -> GrpcResult<Arc<NetworkHierarchy>> {
        self.runtime.block_on(self.inner.get_hierarchy(selection))
    }

    pub fn resolve_references(&self, seed: MultiObjectResult) -> GrpcResult<MultiObjectResult> {
        self.runtime.block_on(self.inner.resolve_references(seed))
    }
}
