//! Application state shared across handlers

use std::sync::Arc;

use application::TodoService;
use infrastructure::{ChaosMonitor, CircuitBreaker};

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Todos use case
    pub todo_service: Arc<TodoService>,
    /// Breaker guarding the todos destination
    pub circuit_breaker: Arc<CircuitBreaker>,
    /// Counters of the chaos strategies
    pub chaos_monitor: Arc<ChaosMonitor>,
}
