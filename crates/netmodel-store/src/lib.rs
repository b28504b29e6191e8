//! netmodel-store: Local object store
//!
//! This crate provides the client-lifetime registry of materialized objects:
//! - `MemoryStore`, implementing the domain `LocalStore` trait
//! - An unresolved-reference index keyed by target identifier
//! - Bidirectional association wiring as both ends become available
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               netmodel-store                │
//! ├─────────────────────────────────────────────┤
//! │  error.rs  - Store error types              │
//! │  memory.rs - In-memory implementation       │
//! └─────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod memory;

// Re-export commonly used types
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
