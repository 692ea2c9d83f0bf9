//! Infrastructure layer - Adapters for external systems
//!
//! Implements the ports defined in the application layer: the HTTP transport
//! to the todos API, the chaos strategies and decision provider, the
//! resilience policies around them, configuration loading and logging.

pub mod adapters;
pub mod chaos;
pub mod config;
pub mod http;
pub mod resilience;
pub mod telemetry;

pub use adapters::*;
pub use chaos::{
    ChaosLayer, ChaosManagerConfig, ChaosMonitor, ChaosPipelineConfig, ChaosStats,
    ChaosStrategyOptions, EnvironmentChaosManager, RandomSource,
};
pub use config::{
    AppConfig, ChaosAppConfig, ResilienceAppConfig, ServerConfig, TelemetryAppConfig,
    TodosAppConfig,
};
pub use http::{HttpTransport, HttpTransportConfig, OutboundRequest, TransportResponse, X_REQUEST_ID};
pub use resilience::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerSnapshot, CircuitState, OutboundPipeline,
    OutboundPipelineBuilder, OutcomePredicate, ResiliencePolicyConfig, RetryConfig,
};
pub use telemetry::{TelemetryError, init_telemetry};
