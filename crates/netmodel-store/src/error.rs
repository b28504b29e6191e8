//! Store error types.

use netmodel_domain::{DomainError, Mrid, Role};
use thiserror::Error;

/// Store-specific errors.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The object has an empty identifier.
    #[error("object of type {entity_type} has an empty mRID")]
    EmptyMrid { entity_type: String },

    /// A declared reference has an empty target identifier.
    #[error("reference {role:?} from '{from}' has an empty target mRID")]
    EmptyReference { from: Mrid, role: Role },
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        DomainError::InvalidObject {
            message: err.to_string(),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
