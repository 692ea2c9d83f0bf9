//! Chaos configuration: strategy toggles, effects and decision inputs.

use std::time::Duration;

use application::ApplicationError;
use domain::{Environment, InjectionRate};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::default_true;
use crate::chaos::{ChaosManagerConfig, ChaosPipelineConfig, DEFAULT_FAULT_MESSAGE};

/// Chaos configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChaosAppConfig {
    /// Enable the latency strategy
    #[serde(default = "default_true")]
    pub latency_enabled: bool,

    /// Enable the fault strategy
    #[serde(default = "default_true")]
    pub fault_enabled: bool,

    /// Enable the outcome strategy
    #[serde(default = "default_true")]
    pub outcome_enabled: bool,

    /// Injected latency in milliseconds (default: 5000)
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,

    /// Message of the synthetic fault
    #[serde(default = "default_fault_message")]
    pub fault_message: String,

    /// Status code of the substituted response (default: 500)
    #[serde(default = "default_outcome_status")]
    pub outcome_status: u16,

    /// Query parameter that force-enables chaos in production
    #[serde(default = "default_override_query_key")]
    pub override_query_key: String,

    /// Value the override parameter must carry
    #[serde(default = "default_override_query_value")]
    pub override_query_value: String,

    /// Injection rate in development (default: 0.05)
    #[serde(default = "default_development_rate")]
    pub development_rate: InjectionRate,

    /// Injection rate in production (default: 0.03)
    #[serde(default = "default_production_rate")]
    pub production_rate: InjectionRate,
}

const fn default_latency_ms() -> u64 {
    5_000
}

fn default_fault_message() -> String {
    DEFAULT_FAULT_MESSAGE.to_string()
}

const fn default_outcome_status() -> u16 {
    500
}

fn default_override_query_key() -> String {
    ChaosManagerConfig::default().override_query_key
}

fn default_override_query_value() -> String {
    ChaosManagerConfig::default().override_query_value
}

fn default_development_rate() -> InjectionRate {
    ChaosManagerConfig::default().development_rate
}

fn default_production_rate() -> InjectionRate {
    ChaosManagerConfig::default().production_rate
}

impl Default for ChaosAppConfig {
    fn default() -> Self {
        Self {
            latency_enabled: true,
            fault_enabled: true,
            outcome_enabled: true,
            latency_ms: default_latency_ms(),
            fault_message: default_fault_message(),
            outcome_status: default_outcome_status(),
            override_query_key: default_override_query_key(),
            override_query_value: default_override_query_value(),
            development_rate: default_development_rate(),
            production_rate: default_production_rate(),
        }
    }
}

impl ChaosAppConfig {
    /// Decision-provider settings for the given environment
    #[must_use]
    pub fn to_manager_config(&self, environment: Environment) -> ChaosManagerConfig {
        ChaosManagerConfig {
            environment,
            override_query_key: self.override_query_key.clone(),
            override_query_value: self.override_query_value.clone(),
            development_rate: self.development_rate,
            production_rate: self.production_rate,
        }
    }

    /// Strategy toggles and effects
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Configuration` if `outcome_status` is not a
    /// valid HTTP status code.
    pub fn to_pipeline_config(&self) -> Result<ChaosPipelineConfig, ApplicationError> {
        let outcome_status = StatusCode::from_u16(self.outcome_status).map_err(|e| {
            ApplicationError::Configuration(format!(
                "chaos.outcome_status {}: {e}",
                self.outcome_status
            ))
        })?;

        Ok(ChaosPipelineConfig {
            latency_enabled: self.latency_enabled,
            latency: Duration::from_millis(self.latency_ms),
            fault_enabled: self.fault_enabled,
            fault_message: self.fault_message.clone(),
            outcome_enabled: self.outcome_enabled,
            outcome_status,
        })
    }
}
