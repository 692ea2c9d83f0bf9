//! Domain-level errors

use thiserror::Error;

use crate::value_objects::InvalidInjectionRate;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// Injection rate outside of `[0, 1]`
    #[error(transparent)]
    InvalidInjectionRate(#[from] InvalidInjectionRate),

    /// Environment name that is not one of the known classifications
    #[error("Unknown environment: {0}")]
    UnknownEnvironment(String),

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_environment_display() {
        let err = DomainError::UnknownEnvironment("staging".to_string());
        assert_eq!(err.to_string(), "Unknown environment: staging");
    }

    #[test]
    fn invalid_rate_is_transparent() {
        let inner = crate::InjectionRate::new(1.5).unwrap_err();
        let err = DomainError::from(inner);
        assert!(err.to_string().contains("1.5"));
    }

    #[test]
    fn validation_error_display() {
        let err = DomainError::ValidationError("title is empty".to_string());
        assert_eq!(err.to_string(), "Validation failed: title is empty");
    }
}
