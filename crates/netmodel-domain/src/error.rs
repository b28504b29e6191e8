//! Domain error types for graph hydration.

use thiserror::Error;

use crate::model::{EntityType, Mrid};

/// Domain-specific errors for fetch, decode and resolution operations.
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    /// A single-identifier lookup returned nothing.
    #[error("no object with mRID '{mrid}' was found")]
    NotFound { mrid: Mrid },

    /// Container assembly received objects of an unexpected type.
    #[error("expected {expected} but the server returned: {found}")]
    TypeMismatch { expected: EntityType, found: String },

    /// The underlying RPC failed (connection, server-side error).
    #[error("transport failure ({code}): {message}")]
    Transport { code: String, message: String },

    /// The response carried a payload variant this client cannot decode.
    #[error("unsupported payload '{type_name}' for mRID '{mrid}'")]
    UnsupportedPayload { mrid: Mrid, type_name: String },

    /// The object was rejected by the local store.
    #[error("invalid object: {message}")]
    InvalidObject { message: String },

    /// The response channel completed before delivering any message.
    #[error("channel closed before a response was received for {operation}")]
    ChannelClosed { operation: String },

    /// Reference resolution did not reach a fixed point within the pass limit.
    #[error("reference resolution exceeded {max_passes} passes")]
    PassLimitExceeded { max_passes: u32 },

    /// The operation did not complete in time.
    #[error("timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },
}

impl DomainError {
    /// Builds a type mismatch error listing every offending object.
    pub fn type_mismatch<'a, I>(expected: EntityType, offenders: I) -> Self
    where
        I: IntoIterator<Item = (&'a Mrid, EntityType)>,
    {
        let found = offenders
            .into_iter()
            .map(|(mrid, entity_type)| format!("{mrid} ({entity_type})"))
            .collect::<Vec<_>>()
            .join(", ");
        DomainError::TypeMismatch { expected, found }
    }

    /// Returns true for errors raised by the transport rather than the engine.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            DomainError::Transport { .. } | DomainError::ChannelClosed { .. }
        )
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
