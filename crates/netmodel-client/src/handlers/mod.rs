//! Request-side plumbing shared by every exchange.

pub mod batch;
