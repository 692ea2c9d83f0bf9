//! Route definitions

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::get,
};
use infrastructure::ServerConfig;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{handlers, middleware::RequestIdLayer, state::AppState};

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Entry use case
        .route("/", get(handlers::todos::list_todos))
        // Health and status endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/resilience", get(handlers::health::resilience_status))
        // Attach state
        .with_state(state)
        // Last added is outermost: the trace span nests inside the request id span
        .layer(TraceLayer::new_for_http())
        .layer(RequestIdLayer::new())
}

/// CORS layer for the server configuration, `None` when CORS is disabled
pub fn cors_layer(config: &ServerConfig) -> Option<CorsLayer> {
    if !config.cors_enabled {
        return None;
    }

    let layer = if config.allowed_origins.is_empty() {
        // Development mode: allow all origins
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET])
            .allow_headers(Any)
    };
    Some(layer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_disabled_yields_none() {
        let config = ServerConfig {
            cors_enabled: false,
            ..ServerConfig::default()
        };
        assert!(cors_layer(&config).is_none());
    }

    #[test]
    fn cors_enabled_by_default() {
        assert!(cors_layer(&ServerConfig::default()).is_some());
    }

    #[test]
    fn cors_with_origins() {
        let config = ServerConfig {
            allowed_origins: vec!["https://example.com".to_string(), "\u{0}bad".to_string()],
            ..ServerConfig::default()
        };
        assert!(cors_layer(&config).is_some());
    }
}
