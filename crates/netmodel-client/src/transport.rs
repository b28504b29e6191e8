//! Transport seam between the client and the network model service.
//!
//! The shape mirrors a generated gRPC client: bidirectional exchanges take a
//! stream of identifier batches and hand back a stream of responses, and the
//! hierarchy query is a single request with a streamed reply. Failures arrive
//! as [`tonic::Status`] and are mapped into the domain taxonomy exactly once,
//! by [`status_to_error`].

use async_trait::async_trait;
use futures::stream::BoxStream;
use tonic::Status;

use netmodel_domain::model::{HierarchyResponse, HierarchySelection, WireObject};
use netmodel_domain::{DomainError, Mrid};

use crate::handlers::batch::IdentifierBatch;

/// Outgoing side of a batched exchange.
pub type RequestStream = BoxStream<'static, IdentifierBatch>;

/// Incoming side of an exchange. The first `Err` ends the exchange.
pub type ResponseStream<T> = BoxStream<'static, Result<T, Status>>;

/// Calls the consumer service exposes.
///
/// Opening an exchange may fail on its own (connection refused, bad
/// credentials); failures after that point are delivered in-stream.
#[async_trait]
pub trait NetworkTransport: Send + Sync + 'static {
    /// Streams identifier batches and receives every object found.
    async fn get_identified_objects(
        &self,
        requests: RequestStream,
    ) -> Result<ResponseStream<WireObject>, Status>;

    /// Streams container identifier batches and receives their equipment.
    async fn get_equipment_for_containers(
        &self,
        requests: RequestStream,
    ) -> Result<ResponseStream<WireObject>, Status>;

    /// Receives the equipment an operational restriction applies to.
    async fn get_equipment_for_restriction(
        &self,
        mrid: Mrid,
    ) -> Result<ResponseStream<WireObject>, Status>;

    /// Receives the organisational hierarchy in one response message.
    async fn get_network_hierarchy(
        &self,
        selection: HierarchySelection,
    ) -> Result<ResponseStream<HierarchyResponse>, Status>;
}

/// Maps a transport status into [`DomainError::Transport`].
pub fn status_to_error(status: Status) -> DomainError {
    DomainError::Transport {
        code: format!("{:?}", status.code()),
        message: status.message().to_string(),
    }
}
