//! API error handling
//!
//! Maps the application taxonomy onto HTTP statuses and sanitizes messages so
//! that production responses do not leak downstream details.

use std::sync::atomic::{AtomicBool, Ordering};

use application::ApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Global flag to control error detail exposure
static EXPOSE_INTERNAL_ERRORS: AtomicBool = AtomicBool::new(true);

/// Configure whether error details should be exposed in responses.
///
/// Set to `false` in production.
pub fn set_expose_internal_errors(expose: bool) {
    EXPOSE_INTERNAL_ERRORS.store(expose, Ordering::SeqCst);
}

fn should_expose_details() -> bool {
    EXPOSE_INTERNAL_ERRORS.load(Ordering::SeqCst)
}

const GENERIC_MESSAGE: &str = "An error occurred processing your request";

/// Patterns that indicate addresses, paths or stack traces
const SENSITIVE_PATTERNS: [&str; 9] = [
    "://",
    "/home/",
    "/Users/",
    "/var/",
    "C:\\",
    "panicked at",
    "stack backtrace",
    ".rs:",
    "connection refused",
];

fn sanitize(msg: &str, expose: bool) -> String {
    if expose {
        return msg.to_string();
    }
    let lower = msg.to_lowercase();
    if SENSITIVE_PATTERNS
        .iter()
        .any(|pattern| lower.contains(&pattern.to_lowercase()))
    {
        return GENERIC_MESSAGE.to_string();
    }
    msg.to_string()
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// The downstream failed or answered with something unusable
    #[error("Bad gateway: {0}")]
    BadGateway(String),

    /// The downstream did not answer in time
    #[error("Gateway timeout: {0}")]
    GatewayTimeout(String),

    /// The circuit guarding the downstream is open
    #[error("Circuit open: {0}")]
    CircuitOpen(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// HTTP status and machine-readable code
    #[must_use]
    pub const fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::BadGateway(_) => (StatusCode::BAD_GATEWAY, "bad_gateway"),
            Self::GatewayTimeout(_) => (StatusCode::GATEWAY_TIMEOUT, "gateway_timeout"),
            Self::CircuitOpen(_) => (StatusCode::SERVICE_UNAVAILABLE, "circuit_open"),
            Self::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }

    fn body(&self, expose: bool) -> ErrorResponse {
        let (_, code) = self.status_and_code();
        let (error, details) = match self {
            Self::BadGateway(msg)
            | Self::GatewayTimeout(msg)
            | Self::CircuitOpen(msg)
            | Self::ServiceUnavailable(msg) => (sanitize(msg, expose), None),
            // Internal errors only carry details when exposure is on
            Self::Internal(msg) => (
                "An internal error occurred".to_string(),
                expose.then(|| msg.clone()),
            ),
        };
        ErrorResponse {
            error,
            code: code.to_string(),
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, _) = self.status_and_code();
        (status, Json(self.body(should_expose_details()))).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::CircuitOpen { service_name } => {
                Self::CircuitOpen(format!("'{service_name}' is temporarily unavailable"))
            },
            e @ ApplicationError::Timeout(_) => Self::GatewayTimeout(e.to_string()),
            ApplicationError::Cancelled => {
                Self::ServiceUnavailable("Request was cancelled".to_string())
            },
            e @ (ApplicationError::Transport(_)
            | ApplicationError::InvalidOperation(_)
            | ApplicationError::UnexpectedStatus(_)
            | ApplicationError::Decode(_)
            | ApplicationError::Domain(_)) => Self::BadGateway(e.to_string()),
            ApplicationError::Configuration(msg) | ApplicationError::Internal(msg) => {
                Self::Internal(msg)
            },
        }
    }
}
