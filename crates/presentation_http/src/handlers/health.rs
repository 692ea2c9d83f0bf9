//! Health check handlers

use axum::{Json, extract::State, http::StatusCode};
use infrastructure::{ChaosStats, CircuitBreakerSnapshot, CircuitState};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Liveness check - is the server running?
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// State of the outbound pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResilienceResponse {
    /// False while the circuit is open
    pub ready: bool,
    pub circuit: CircuitBreakerSnapshot,
    pub chaos: ChaosStats,
}

/// Circuit state and chaos counters
///
/// Answers 503 while the circuit is open, so it doubles as a readiness probe.
pub async fn resilience_status(
    State(state): State<AppState>,
) -> (StatusCode, Json<ResilienceResponse>) {
    let circuit = state.circuit_breaker.snapshot();
    let ready = circuit.state != CircuitState::Open;
    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(ResilienceResponse {
            ready,
            circuit,
            chaos: state.chaos_monitor.snapshot(),
        }),
    )
}
