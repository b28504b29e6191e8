//! netmodel-domain: Core graph hydration logic
//!
//! This crate contains the transport-independent part of the client:
//! - Identifier, entity and wire payload model
//! - Result aggregation for multi-object fetches
//! - Reference resolution engine (fixed-point graph closure)
//! - Network hierarchy snapshot cache
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               netmodel-domain               │
//! ├─────────────────────────────────────────────┤
//! │  model/      - Identifiers, entities, wire  │
//! │  extraction/ - Multi-object result folding  │
//! │  resolver/   - Reference resolution engine  │
//! │  cache/      - Network hierarchy snapshot   │
//! └─────────────────────────────────────────────┘
//! ```

pub mod cache;
pub mod error;
pub mod extraction;
pub mod model;
pub mod resolver;

// Re-export commonly used types at the crate root
pub use cache::{HierarchyCache, HierarchyCacheMetrics};
pub use error::{DomainError, DomainResult};
pub use extraction::{ExtractResult, MultiObjectResult};
pub use model::{EntityType, Mrid, NetworkHierarchy, NetworkObject, Role, UnresolvedReference};
