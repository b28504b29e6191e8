//! Tests for the reference resolver.
//!
//! Organized by functionality:
//! - Fixed point and termination
//! - Container filtering between passes
//! - Failure propagation
