//! Environment-driven chaos decisions.

use application::{ChaosDecisionPort, ExecutionContext};
use domain::{Environment, InjectionRate};
use serde::{Deserialize, Serialize};

/// Immutable configuration of the chaos decision provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChaosManagerConfig {
    /// Ambient environment of the process
    #[serde(default)]
    pub environment: Environment,

    /// Query parameter that force-enables chaos in production
    #[serde(default = "default_override_key")]
    pub override_query_key: String,

    /// Value the override parameter must carry
    #[serde(default = "default_override_value")]
    pub override_query_value: String,

    /// Injection rate in development (default: 0.05)
    #[serde(default = "default_development_rate")]
    pub development_rate: InjectionRate,

    /// Injection rate in production (default: 0.03)
    #[serde(default = "default_production_rate")]
    pub production_rate: InjectionRate,
}

fn default_override_key() -> String {
    "user".to_string()
}

fn default_override_value() -> String {
    "test".to_string()
}

fn default_development_rate() -> InjectionRate {
    InjectionRate::clamped(0.05)
}

fn default_production_rate() -> InjectionRate {
    InjectionRate::clamped(0.03)
}

impl Default for ChaosManagerConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            override_query_key: default_override_key(),
            override_query_value: default_override_value(),
            development_rate: default_development_rate(),
            production_rate: default_production_rate(),
        }
    }
}

impl ChaosManagerConfig {
    /// Default configuration for the given environment
    #[must_use]
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            environment,
            ..Self::default()
        }
    }
}

/// Decides chaos per execution from the environment and the override marker
///
/// - development: always enabled, development rate
/// - production: enabled only when the inbound request carries the override
///   marker, production rate
/// - anything else: disabled, rate zero
#[derive(Debug, Clone)]
pub struct EnvironmentChaosManager {
    config: ChaosManagerConfig,
}

impl EnvironmentChaosManager {
    /// Create a manager from configuration
    #[must_use]
    pub const fn new(config: ChaosManagerConfig) -> Self {
        Self { config }
    }

    /// The configuration this manager decides from
    #[must_use]
    pub const fn config(&self) -> &ChaosManagerConfig {
        &self.config
    }

    fn has_override_marker(&self, ctx: &ExecutionContext) -> bool {
        ctx.query_param(&self.config.override_query_key)
            .is_some_and(|value| value == self.config.override_query_value)
    }
}

impl ChaosDecisionPort for EnvironmentChaosManager {
    fn is_enabled(&self, ctx: &ExecutionContext) -> bool {
        match &self.config.environment {
            Environment::Development => true,
            Environment::Production => self.has_override_marker(ctx),
            Environment::Unclassified | Environment::Other(_) => false,
        }
    }

    fn injection_rate(&self, _ctx: &ExecutionContext) -> InjectionRate {
        match &self.config.environment {
            Environment::Development => self.config.development_rate,
            Environment::Production => self.config.production_rate,
            Environment::Unclassified | Environment::Other(_) => InjectionRate::NEVER,
        }
    }
}
