//! netmodel-client: Consumer client for the network model service
//!
//! This crate wires the domain engine to a streaming transport:
//! - Transport seam (`NetworkTransport`) and status mapping
//! - Batch dispatcher and the response bridge
//! - Outcome wrapper (`GrpcResult`) with pluggable error handlers
//! - Container assembly and the public `NetworkConsumerClient`
//! - Blocking facade, configuration and logging bootstrap
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               netmodel-client                │
//! ├──────────────────────────────────────────────┤
//! │  client/     - Public operations, assembly   │
//! │  handlers/   - Batch plan, response bridge   │
//! │  outcome     - GrpcResult, error handlers    │
//! │  transport   - NetworkTransport seam         │
//! ├──────────────────────────────────────────────┤
//! │  netmodel-domain  │  netmodel-store          │
//! └──────────────────────────────────────────────┘
//! ```

pub mod blocking;
pub mod client;
pub mod config;
pub mod handlers;
pub mod observability;
pub mod outcome;
pub mod transport;

pub use blocking::BlockingConsumerClient;
pub use client::{ClientMetrics, ClientMetricsSnapshot, NetworkConsumerClient};
pub use config::{ClientConfig, ConfigLoadError};
pub use outcome::{ErrorHandler, GrpcResult, LoggingErrorHandler};
pub use transport::{NetworkTransport, RequestStream, ResponseStream};
