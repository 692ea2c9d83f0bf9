//! Retry with exponential backoff
//!
//! `RetryLayer` re-drives everything below it (circuit breaker, attempt
//! timeout, chaos strategies, transport) while the outcome matches its
//! [`OutcomePredicate`]. Backoff grows exponentially with jitter to prevent
//! thundering herd and is abandoned as soon as the call is cancelled.

use std::{
    task::{Context, Poll},
    time::Duration,
};

use application::ApplicationError;
use futures::future::BoxFuture;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tower::{Layer, Service, ServiceExt};
use tracing::{debug, warn};

use super::classification::OutcomePredicate;
use crate::http::{Outcome, OutboundRequest, TransportResponse};

/// Configuration for retry behavior with exponential backoff
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Initial delay before first retry in milliseconds (default: 2000ms)
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    /// Maximum delay between retries in milliseconds (default: 30000ms)
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Maximum number of retries after the first attempt (default: 3)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Whether to add jitter to prevent thundering herd (default: true)
    #[serde(default = "default_true")]
    pub jitter_enabled: bool,

    /// Maximum jitter factor (0.0 to 1.0, default: 0.1 = 10%)
    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,
}

const fn default_initial_delay() -> u64 {
    2_000
}

const fn default_max_delay() -> u64 {
    30_000
}

const fn default_multiplier() -> f64 {
    2.0
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_true() -> bool {
    true
}

const fn default_jitter_factor() -> f64 {
    0.1
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay(),
            max_delay_ms: default_max_delay(),
            multiplier: default_multiplier(),
            max_retries: default_max_retries(),
            jitter_enabled: default_true(),
            jitter_factor: default_jitter_factor(),
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration with custom parameters
    #[must_use]
    pub const fn new(
        initial_delay_ms: u64,
        max_delay_ms: u64,
        multiplier: f64,
        max_retries: u32,
    ) -> Self {
        Self {
            initial_delay_ms,
            max_delay_ms,
            multiplier,
            max_retries,
            jitter_enabled: true,
            jitter_factor: 0.1,
        }
    }

    /// Create a configuration optimized for fast retries (low latency operations)
    #[must_use]
    pub const fn fast() -> Self {
        Self {
            initial_delay_ms: 50,
            max_delay_ms: 1000,
            multiplier: 2.0,
            max_retries: 3,
            jitter_enabled: true,
            jitter_factor: 0.1,
        }
    }

    /// Disable jitter (not recommended for production)
    #[must_use]
    pub const fn without_jitter(mut self) -> Self {
        self.jitter_enabled = false;
        self
    }

    /// Total number of attempts including the first one
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Calculate the delay for a given retry number (0-indexed)
    ///
    /// Uses exponential backoff: delay = initial_delay * multiplier^attempt
    /// Capped at max_delay, with optional jitter to prevent thundering herd.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_wrap,
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation
    )]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base_delay = (self.initial_delay_ms as f64) * self.multiplier.powi(attempt as i32);
        let capped_delay = base_delay.min(self.max_delay_ms as f64);

        let final_delay = if self.jitter_enabled && self.jitter_factor > 0.0 {
            let jitter_range = capped_delay * self.jitter_factor;
            let jitter = rand::rng().random_range(-jitter_range..=jitter_range);
            (capped_delay + jitter).max(0.0)
        } else {
            capped_delay
        };

        // final_delay is capped and non-negative
        Duration::from_millis(final_delay as u64)
    }
}

/// Layer that retries handled outcomes
#[derive(Debug, Clone)]
pub struct RetryLayer {
    config: RetryConfig,
    should_handle: OutcomePredicate,
}

impl RetryLayer {
    /// Create a retry layer
    #[must_use]
    pub const fn new(config: RetryConfig, should_handle: OutcomePredicate) -> Self {
        Self {
            config,
            should_handle,
        }
    }
}

impl<S> Layer<S> for RetryLayer {
    type Service = Retry<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Retry {
            inner,
            config: self.config.clone(),
            should_handle: self.should_handle.clone(),
        }
    }
}

/// Service produced by [`RetryLayer`]
#[derive(Debug, Clone)]
pub struct Retry<S> {
    inner: S,
    config: RetryConfig,
    should_handle: OutcomePredicate,
}

fn describe(outcome: &Outcome) -> String {
    match outcome {
        Ok(response) => format!("status {}", response.status().as_u16()),
        Err(e) => e.to_string(),
    }
}

impl<S> Service<OutboundRequest> for Retry<S>
where
    S: Service<OutboundRequest, Response = TransportResponse, Error = ApplicationError>
        + Clone
        + Send
        + 'static,
    S::Future: Send + 'static,
{
    type Response = TransportResponse;
    type Error = ApplicationError;
    type Future = BoxFuture<'static, Outcome>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: OutboundRequest) -> Self::Future {
        let clone = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, clone);
        let config = self.config.clone();
        let should_handle = self.should_handle.clone();

        Box::pin(async move {
            let mut attempt = 1u32;

            loop {
                let outcome = inner.clone().oneshot(request.for_attempt(attempt)).await;

                if !should_handle.should_handle(&outcome) {
                    if attempt > 1 && outcome.is_ok() {
                        debug!(
                            operation = request.context().operation(),
                            attempts = attempt,
                            "Operation succeeded after retries"
                        );
                    }
                    return outcome;
                }

                let retry_attempt = attempt - 1;
                if retry_attempt >= config.max_retries {
                    warn!(
                        operation = request.context().operation(),
                        attempts = attempt,
                        max_retries = config.max_retries,
                        outcome = %describe(&outcome),
                        "Operation failed after max retries"
                    );
                    return outcome;
                }

                let delay = config.delay_for_attempt(retry_attempt);
                warn!(
                    operation = request.context().operation(),
                    attempt,
                    max_retries = config.max_retries,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    outcome = %describe(&outcome),
                    "Operation failed, retrying"
                );

                tokio::select! {
                    biased;
                    () = request.context().cancellation().cancelled() => {
                        return Err(ApplicationError::Cancelled);
                    },
                    () = tokio::time::sleep(delay) => {},
                }

                attempt += 1;
            }
        })
    }
}
