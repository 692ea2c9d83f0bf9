//! Application configuration
//!
//! Split into focused sub-modules:
//! - `server`: HTTP server settings
//! - `todos`: downstream todos API
//! - `chaos`: chaos strategies and decision inputs
//! - `resilience`: timeouts, retry, circuit breaker
//! - `telemetry`: logging
//!
//! Sources, later ones overriding earlier ones: built-in defaults, an optional
//! `config.toml` in the working directory, then environment variables
//! prefixed `CHAOS_TODOS` with `__` between path segments
//! (e.g. `CHAOS_TODOS__SERVER__PORT=8080`, `CHAOS_TODOS__ENVIRONMENT=production`).

mod chaos;
mod resilience;
mod server;
mod telemetry;
mod todos;

use std::path::Path;

use domain::Environment;
use serde::{Deserialize, Serialize};
use tracing::info;

pub use chaos::ChaosAppConfig;
pub use resilience::{CircuitBreakerAppConfig, ResilienceAppConfig};
pub use server::ServerConfig;
pub use telemetry::TelemetryAppConfig;
pub use todos::TodosAppConfig;

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "CHAOS_TODOS";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Ambient environment; unknown names are kept as `Other`
    #[serde(default)]
    pub environment: Environment,

    /// HTTP server
    #[serde(default)]
    pub server: ServerConfig,

    /// Downstream todos API
    #[serde(default)]
    pub todos: TodosAppConfig,

    /// Chaos injection
    #[serde(default)]
    pub chaos: ChaosAppConfig,

    /// Outbound resilience policies
    #[serde(default)]
    pub resilience: ResilienceAppConfig,

    /// Logging
    #[serde(default)]
    pub telemetry: TelemetryAppConfig,
}

impl AppConfig {
    /// Load configuration from `config.toml` (optional) and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::with_name("config").required(false))
            // Override with environment variables (e.g., CHAOS_TODOS__SERVER__PORT)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        info!(environment = %config.environment, "Configuration loaded");
        Ok(config)
    }

    /// Load configuration from one file, without environment overrides
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from(path))
            .build()?
            .try_deserialize()
    }
}
