//! Resilience configurations: timeouts, retry and circuit breaker.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::resilience::{CircuitBreakerConfig, ResiliencePolicyConfig, RetryConfig};

// ==============================
// Circuit Breaker Configuration
// ==============================

/// Rolling-window circuit breaker settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerAppConfig {
    /// Failure ratio that opens the circuit (default: 0.1)
    #[serde(default = "default_failure_ratio")]
    pub failure_ratio: f64,

    /// Calls required in the window before the ratio counts (default: 100)
    #[serde(default = "default_minimum_throughput")]
    pub minimum_throughput: u32,

    /// Sampling window in seconds (default: 30)
    #[serde(default = "default_sampling_duration")]
    pub sampling_duration_secs: u64,

    /// Seconds the circuit stays open (default: 5)
    #[serde(default = "default_break_duration")]
    pub break_duration_secs: u64,
}

const fn default_failure_ratio() -> f64 {
    0.1
}

const fn default_minimum_throughput() -> u32 {
    100
}

const fn default_sampling_duration() -> u64 {
    30
}

const fn default_break_duration() -> u64 {
    5
}

impl Default for CircuitBreakerAppConfig {
    fn default() -> Self {
        Self {
            failure_ratio: default_failure_ratio(),
            minimum_throughput: default_minimum_throughput(),
            sampling_duration_secs: default_sampling_duration(),
            break_duration_secs: default_break_duration(),
        }
    }
}

impl CircuitBreakerAppConfig {
    /// Convert to the breaker's runtime configuration
    #[must_use]
    pub fn to_breaker_config(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig::custom(
            self.failure_ratio.clamp(0.0, 1.0),
            self.minimum_throughput,
            Duration::from_secs(self.sampling_duration_secs),
            Duration::from_secs(self.break_duration_secs),
        )
    }
}

// ==============================
// Resilience Configuration
// ==============================

/// Timeouts, retry and circuit breaker for outbound calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResilienceAppConfig {
    /// Budget of one attempt in milliseconds (default: 1000)
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout_ms: u64,

    /// Budget of the whole call in milliseconds (default: 30000)
    #[serde(default = "default_total_timeout")]
    pub total_timeout_ms: u64,

    /// Retry backoff
    #[serde(default)]
    pub retry: RetryConfig,

    /// Circuit breaker
    #[serde(default)]
    pub circuit_breaker: CircuitBreakerAppConfig,
}

const fn default_attempt_timeout() -> u64 {
    1_000
}

const fn default_total_timeout() -> u64 {
    30_000
}

impl Default for ResilienceAppConfig {
    fn default() -> Self {
        Self {
            attempt_timeout_ms: default_attempt_timeout(),
            total_timeout_ms: default_total_timeout(),
            retry: RetryConfig::default(),
            circuit_breaker: CircuitBreakerAppConfig::default(),
        }
    }
}

impl ResilienceAppConfig {
    /// Build the immutable policy set, using the standard outcome predicate
    #[must_use]
    pub fn to_policy_config(&self) -> ResiliencePolicyConfig {
        ResiliencePolicyConfig {
            total_timeout: Duration::from_millis(self.total_timeout_ms),
            attempt_timeout: Duration::from_millis(self.attempt_timeout_ms),
            retry: self.retry.clone(),
            circuit_breaker: self.circuit_breaker.to_breaker_config(),
            ..ResiliencePolicyConfig::default()
        }
    }
}
