//! Batched identifier exchanges feeding the result aggregator.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::StreamExt;
use tracing::{debug, instrument};

use netmodel_domain::extraction::{extract, handle_multi_object};
use netmodel_domain::model::WireObject;
use netmodel_domain::resolver::{LocalStore, ObjectFetcher};
use netmodel_domain::{DomainResult, Mrid, MultiObjectResult};

use super::metrics::ClientMetrics;
use crate::handlers::batch::{AwaitableResponses, BatchPlan};
use crate::transport::{status_to_error, NetworkTransport, ResponseStream};

#[derive(Debug, Clone, Copy)]
enum Exchange {
    IdentifiedObjects,
    EquipmentForContainers,
}

impl Exchange {
    fn name(self) -> &'static str {
        match self {
            Exchange::IdentifiedObjects => "get_identified_objects",
            Exchange::EquipmentForContainers => "get_equipment_for_containers",
        }
    }

    /// Whether every planned identifier is expected back.
    fn expects_requested(self) -> bool {
        matches!(self, Exchange::IdentifiedObjects)
    }
}

/// Runs exchanges against a transport, registering responses in the store.
pub struct IdentifiedObjectFetcher<T, S> {
    transport: Arc<T>,
    store: Arc<S>,
    batch_size: usize,
    response_buffer: usize,
    metrics: Arc<ClientMetrics>,
}

impl<T, S> IdentifiedObjectFetcher<T, S>
where
    T: NetworkTransport,
    S: LocalStore + 'static,
{
    pub fn new(
        transport: Arc<T>,
        store: Arc<S>,
        batch_size: usize,
        response_buffer: usize,
        metrics: Arc<ClientMetrics>,
    ) -> Self {
        Self {
            transport,
            store,
            batch_size,
            response_buffer,
            metrics,
        }
    }

    /// Fetches identified objects, answering from the store where possible.
    pub async fn identified_objects(&self, mrids: Vec<Mrid>) -> DomainResult<MultiObjectResult> {
        let mut result = MultiObjectResult::new();
        let mut missing = Vec::new();
        for mrid in mrids {
            match self.store.get(&mrid) {
                Some(object) => result.insert(object),
                None => missing.push(mrid),
            }
        }

        if !missing.is_empty() {
            let fetched = self.exchange(Exchange::IdentifiedObjects, missing).await?;
            result.merge(fetched);
        }
        Ok(result)
    }

    /// Fetches the equipment held by each container. No resolution.
    pub async fn equipment_for_containers(
        &self,
        mrids: Vec<Mrid>,
    ) -> DomainResult<MultiObjectResult> {
        self.exchange(Exchange::EquipmentForContainers, mrids).await
    }

    /// Fetches the equipment an operational restriction applies to.
    #[instrument(skip(self, mrid), fields(restriction = %mrid))]
    pub async fn equipment_for_restriction(&self, mrid: Mrid) -> DomainResult<MultiObjectResult> {
        self.metrics.record_exchange();
        let responses = self
            .transport
            .get_equipment_for_restriction(mrid)
            .await
            .map_err(status_to_error)?;
        self.collect("get_equipment_for_restriction", responses, None)
            .await
    }

    async fn exchange(
        &self,
        exchange: Exchange,
        mrids: Vec<Mrid>,
    ) -> DomainResult<MultiObjectResult> {
        let plan = BatchPlan::new(mrids, self.batch_size);
        if plan.is_empty() {
            return Ok(MultiObjectResult::new());
        }

        debug!(
            exchange = exchange.name(),
            batches = plan.len(),
            mrids = plan.total_mrids(),
            "opening exchange"
        );

        let requested: Vec<Mrid> = plan.mrids().cloned().collect();
        let metrics = Arc::clone(&self.metrics);
        let requests = plan
            .into_request_stream()
            .inspect(move |_| metrics.record_batch())
            .boxed();

        self.metrics.record_exchange();
        let responses = match exchange {
            Exchange::IdentifiedObjects => self.transport.get_identified_objects(requests).await,
            Exchange::EquipmentForContainers => {
                self.transport.get_equipment_for_containers(requests).await
            }
        }
        .map_err(status_to_error)?;

        let requested = exchange
            .expects_requested()
            .then_some(requested.as_slice());
        self.collect(exchange.name(), responses, requested).await
    }

    /// Decodes and registers every response, folding them into one result.
    async fn collect(
        &self,
        operation: &'static str,
        responses: ResponseStream<WireObject>,
        requested: Option<&[Mrid]>,
    ) -> DomainResult<MultiObjectResult> {
        let store = Arc::clone(&self.store);
        let metrics = Arc::clone(&self.metrics);
        let extracted = AwaitableResponses::spawn(operation, responses, self.response_buffer)
            .into_stream()
            .map(move |item| {
                item.map(|wire| {
                    metrics.record_object();
                    extract(store.as_ref(), wire)
                })
            });

        handle_multi_object(requested, extracted).await
    }
}

#[async_trait]
impl<T, S> ObjectFetcher for IdentifiedObjectFetcher<T, S>
where
    T: NetworkTransport,
    S: LocalStore + 'static,
{
    async fn fetch_objects(&self, mrids: Vec<Mrid>) -> DomainResult<MultiObjectResult> {
        self.identified_objects(mrids).await
    }
}
