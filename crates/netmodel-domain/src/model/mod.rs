//! Network model types.
//!
//! The engine only needs an entity's identifier, its type, and the references
//! it makes to other identifiers. Everything else about the power-network
//! schema lives outside this crate.

mod hierarchy;
mod object;
mod types;
mod types_proptest;
mod wire;

pub use hierarchy::{loop_containers, HierarchySelection, NetworkHierarchy};
pub use object::{NetworkObject, UnresolvedReference};
pub use types::{EntityType, Mrid, Role};
pub use wire::{EquipmentKind, HierarchyResponse, WireObject, WirePayload};
