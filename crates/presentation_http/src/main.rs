//! Chaos todos HTTP server
//!
//! Main entry point for the HTTP API server.

use std::{future::IntoFuture, sync::Arc, time::Duration};

use application::TodoService;
use infrastructure::{AppConfig, TodosAdapter, init_telemetry};
use presentation_http::{cors_layer, error::set_expose_internal_errors, routes, state::AppState};
use tokio::{net::TcpListener, signal};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let loaded = AppConfig::load();
    let config = loaded.as_ref().cloned().unwrap_or_default();

    init_telemetry(&config.telemetry)?;

    if let Err(e) = &loaded {
        warn!("Failed to load config, using defaults: {}", e);
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        todos = %config.todos.base_url,
        "Chaos todos server starting"
    );

    set_expose_internal_errors(!config.environment.is_production());

    let todos = TodosAdapter::from_config(&config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize todos client: {e}"))?;

    let state = AppState {
        todo_service: Arc::new(TodoService::new(Arc::new(todos.adapter))),
        circuit_breaker: todos.circuit_breaker,
        chaos_monitor: todos.chaos_monitor,
    };

    let mut app = routes::create_router(state);
    if let Some(cors) = cors_layer(&config.server) {
        app = app.layer(cors);
    }

    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_secs.unwrap_or(30));
    let shutdown = CancellationToken::new();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown({
            let shutdown = shutdown.clone();
            async move { shutdown.cancelled().await }
        })
        .into_future();

    tokio::select! {
        result = server => result?,
        () = async {
            shutdown_signal().await;
            shutdown.cancel();
            info!("Waiting up to {:?} for connections to close...", shutdown_timeout);
            tokio::time::sleep(shutdown_timeout).await;
        } => {
            warn!("Shutdown timeout elapsed, dropping remaining connections");
        }
    }

    info!("Server shutdown complete");

    Ok(())
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        // Log error but continue waiting - this is a best-effort signal handler
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
