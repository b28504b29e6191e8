//! Property-based tests for model types.
