//! Reference resolution engine.
//!
//! The engine closes a partially fetched subgraph: it repeatedly asks the
//! local store which references from newly known objects are still
//! outstanding, fetches their targets in bounded batches, and merges the
//! results until no new identifiers turn up.
//!
//! # Design
//!
//! - **Breadth-first passes**: each pass only looks at the objects first seen
//!   on the previous pass, and never re-requests an identifier already tried,
//!   so a fixed point is always reached.
//!
//! - **Container filtering**: the first pass follows every reference. Later
//!   passes skip references made by containers and references that point at
//!   containers, so an equipment item reached through connectivity does not
//!   drag in every other container it belongs to.
//!
//! - **Pass limit**: a configurable ceiling (default 100) turns a
//!   pathological graph into an error instead of an unbounded loop.

mod config;
mod context;
mod engine;
mod traits;

#[cfg(test)]
pub(crate) mod tests;

pub use config::ResolverConfig;
pub use context::Phase;
pub use engine::ReferenceResolver;
pub use traits::{LocalStore, ObjectFetcher};
