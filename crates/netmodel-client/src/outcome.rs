//! Success/failure envelope returned by every public client operation.
//!
//! A failure is offered to every registered [`ErrorHandler`] before it is
//! returned; the envelope records whether any of them claimed it. Handlers
//! are for side effects such as logging or counting. The caller still
//! decides what to do with the failure.

use std::sync::Arc;

use tracing::warn;

use netmodel_domain::{DomainError, DomainResult};

/// Observer for failed operations.
pub trait ErrorHandler: Send + Sync {
    /// Returns true if the handler consumed the error.
    fn handle(&self, error: &DomainError) -> bool;
}

impl<F> ErrorHandler for F
where
    F: Fn(&DomainError) -> bool + Send + Sync,
{
    fn handle(&self, error: &DomainError) -> bool {
        self(error)
    }
}

/// Logs every failure at `warn` without claiming it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingErrorHandler;

impl ErrorHandler for LoggingErrorHandler {
    fn handle(&self, error: &DomainError) -> bool {
        warn!(error = %error, transport = error.is_transport(), "client operation failed");
        false
    }
}

/// Outcome of a client operation.
#[derive(Debug, Clone)]
pub enum GrpcResult<T> {
    Success(T),
    Failure { error: DomainError, handled: bool },
}

impl<T> GrpcResult<T> {
    /// Wraps `result`, offering an error to every handler in order.
    ///
    /// All handlers see the error even after one has claimed it.
    pub fn of(result: DomainResult<T>, handlers: &[Arc<dyn ErrorHandler>]) -> Self {
        match result {
            Ok(value) => GrpcResult::Success(value),
            Err(error) => {
                let handled = handlers
                    .iter()
                    .fold(false, |handled, handler| handler.handle(&error) || handled);
                GrpcResult::Failure { error, handled }
            }
        }
    }

    pub fn is_successful(&self) -> bool {
        matches!(self, GrpcResult::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        !self.is_successful()
    }

    /// True if the operation failed and a handler claimed the error.
    pub fn was_handled(&self) -> bool {
        matches!(self, GrpcResult::Failure { handled: true, .. })
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            GrpcResult::Success(value) => Some(value),
            GrpcResult::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&DomainError> {
        match self {
            GrpcResult::Success(_) => None,
            GrpcResult::Failure { error, .. } => Some(error),
        }
    }

    pub fn into_result(self) -> DomainResult<T> {
        match self {
            GrpcResult::Success(value) => Ok(value),
            GrpcResult::Failure { error, .. } => Err(error),
        }
    }

    /// Returns the value, or the error unless a handler claimed it.
    ///
    /// `Ok(None)` means the operation failed and the failure was handled.
    pub fn into_unhandled_result(self) -> DomainResult<Option<T>> {
        match self {
            GrpcResult::Success(value) => Ok(Some(value)),
            GrpcResult::Failure { handled: true, .. } => Ok(None),
            GrpcResult::Failure { error, .. } => Err(error),
        }
    }

    pub fn map<U, F>(self, f: F) -> GrpcResult<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            GrpcResult::Success(value) => GrpcResult::Success(f(value)),
            GrpcResult::Failure { error, handled } => GrpcResult::Failure { error, handled },
        }
    }

    pub fn on_success<F>(self, f: F) -> Self
    where
        F: FnOnce(&T),
    {
        if let GrpcResult::Success(value) = &self {
            f(value);
        }
        self
    }

    /// Runs `f` with the error and its handled flag on failure.
    pub fn on_error<F>(self, f: F) -> Self
    where
        F: FnOnce(&DomainError, bool),
    {
        if let GrpcResult::Failure { error, handled } = &self {
            f(error, *handled);
        }
        self
    }
}

impl<T> From<GrpcResult<T>> for DomainResult<T> {
    fn from(outcome: GrpcResult<T>) -> Self {
        outcome.into_result()
    }
}
