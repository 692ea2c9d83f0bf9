//! Application-level errors
//!
//! One taxonomy for everything that can surface from an outbound call:
//! transport-transient failures, the synthetic chaos fault, non-matching
//! failures and the fast-fail of an open circuit. Callers tell them apart by
//! variant only.

use std::time::Duration;

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Network or connection failure talking to the downstream service
    #[error("Transport error: {0}")]
    Transport(String),

    /// A single attempt or the whole call exceeded its time budget
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Invalid-operation condition; the chaos fault strategy raises this too
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Downstream answered with a non-success status
    #[error("Unexpected status code: {0}")]
    UnexpectedStatus(u16),

    /// Circuit breaker is open and the call was not attempted
    #[error("Circuit breaker open for service '{service_name}': service is temporarily unavailable")]
    CircuitOpen {
        /// Name of the protected destination
        service_name: String,
    },

    /// Response body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The caller cancelled the operation
    #[error("Operation cancelled")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Status codes treated as transient: 5xx, 408 and 429
#[must_use]
pub const fn is_transient_status(code: u16) -> bool {
    code >= 500 || code == 408 || code == 429
}

impl ApplicationError {
    /// Check if this error is a transport-transient condition
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout(_) => true,
            Self::UnexpectedStatus(code) => is_transient_status(*code),
            _ => false,
        }
    }

    /// Check if this error is retryable
    ///
    /// Transient conditions and invalid-operation errors are retried; nothing
    /// else is, including an open circuit.
    pub const fn is_retryable(&self) -> bool {
        self.is_transient() || matches!(self, Self::InvalidOperation(_))
    }

    /// Returns true if the call failed fast on an open circuit
    pub const fn is_circuit_open(&self) -> bool {
        matches!(self, Self::CircuitOpen { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_and_timeout_are_transient() {
        assert!(ApplicationError::Transport("reset".to_string()).is_transient());
        assert!(ApplicationError::Timeout(Duration::from_secs(1)).is_transient());
    }

    #[test]
    fn transient_status_codes() {
        for code in [500, 502, 503, 504, 408, 429] {
            assert!(ApplicationError::UnexpectedStatus(code).is_transient(), "{code}");
        }
        for code in [400, 401, 403, 404, 409] {
            assert!(!ApplicationError::UnexpectedStatus(code).is_transient(), "{code}");
        }
    }

    #[test]
    fn invalid_operation_is_retryable_but_not_transient() {
        let err = ApplicationError::InvalidOperation("Chaos strategy injection!".to_string());
        assert!(!err.is_transient());
        assert!(err.is_retryable());
    }

    #[test]
    fn non_matching_errors_are_not_retryable() {
        assert!(!ApplicationError::Decode("eof".to_string()).is_retryable());
        assert!(!ApplicationError::Cancelled.is_retryable());
        assert!(!ApplicationError::Internal("x".to_string()).is_retryable());
        assert!(!ApplicationError::UnexpectedStatus(404).is_retryable());
    }

    #[test]
    fn circuit_open_is_distinct_and_not_retryable() {
        let err = ApplicationError::CircuitOpen {
            service_name: "todos".to_string(),
        };
        assert!(err.is_circuit_open());
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("todos"));
    }

    #[test]
    fn domain_error_converts() {
        let err: ApplicationError = DomainError::ValidationError("x".to_string()).into();
        assert!(matches!(err, ApplicationError::Domain(_)));
    }
}
