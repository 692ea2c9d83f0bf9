//! Composition of the outbound pipeline.

use std::{fmt, sync::Arc, time::Duration};

use application::ApplicationError;
use tower::{Layer, Service, ServiceBuilder, util::BoxCloneSyncService};
use tracing::info;

use super::{
    circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerLayer},
    classification::OutcomePredicate,
    retry::{RetryConfig, RetryLayer},
    timeout::TimeoutLayer,
};
use crate::{
    chaos::ChaosLayer,
    http::{OutboundRequest, TransportResponse},
};

/// The composed outbound pipeline, cheap to clone per call
pub type OutboundPipeline =
    BoxCloneSyncService<OutboundRequest, TransportResponse, ApplicationError>;

/// Resilience policies, immutable once built
#[derive(Debug, Clone)]
pub struct ResiliencePolicyConfig {
    /// Budget for the whole call including retries
    pub total_timeout: Duration,
    /// Budget for a single attempt
    pub attempt_timeout: Duration,
    /// Retry backoff and limits
    pub retry: RetryConfig,
    /// Outcomes the retry layer handles
    pub retry_should_handle: OutcomePredicate,
    /// Rolling-window circuit breaker settings
    pub circuit_breaker: CircuitBreakerConfig,
    /// Outcomes the circuit breaker counts as failures
    pub breaker_should_handle: OutcomePredicate,
}

impl Default for ResiliencePolicyConfig {
    fn default() -> Self {
        Self {
            total_timeout: Duration::from_secs(30),
            attempt_timeout: Duration::from_secs(1),
            retry: RetryConfig::default(),
            retry_should_handle: OutcomePredicate::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
            breaker_should_handle: OutcomePredicate::default(),
        }
    }
}

/// Builds `TotalTimeout → Retry → CircuitBreaker → AttemptTimeout → chaos → transport`
pub struct OutboundPipelineBuilder {
    service_name: String,
    policy: ResiliencePolicyConfig,
    chaos: Option<ChaosLayer>,
    circuit_breaker: Option<Arc<CircuitBreaker>>,
}

impl fmt::Debug for OutboundPipelineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutboundPipelineBuilder")
            .field("service_name", &self.service_name)
            .field("policy", &self.policy)
            .field("chaos", &self.chaos.is_some())
            .finish_non_exhaustive()
    }
}

impl OutboundPipelineBuilder {
    /// Start a builder for the named destination with default policies
    #[must_use]
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            policy: ResiliencePolicyConfig::default(),
            chaos: None,
            circuit_breaker: None,
        }
    }

    /// Use the given policies
    #[must_use]
    pub fn with_policy(mut self, policy: ResiliencePolicyConfig) -> Self {
        self.policy = policy;
        self
    }

    /// Insert the chaos strategies between the attempt timeout and the transport
    #[must_use]
    pub fn with_chaos(mut self, chaos: ChaosLayer) -> Self {
        self.chaos = Some(chaos);
        self
    }

    /// Share an existing breaker instead of creating one from the policy
    #[must_use]
    pub fn with_circuit_breaker(mut self, circuit_breaker: Arc<CircuitBreaker>) -> Self {
        self.circuit_breaker = Some(circuit_breaker);
        self
    }

    /// Wrap `transport` in the configured layers
    pub fn build<S>(self, transport: S) -> OutboundPipeline
    where
        S: Service<OutboundRequest, Response = TransportResponse, Error = ApplicationError>
            + Clone
            + Send
            + Sync
            + 'static,
        S::Future: Send + 'static,
    {
        let Self {
            service_name,
            policy,
            chaos,
            circuit_breaker,
        } = self;

        let circuit_breaker = circuit_breaker.unwrap_or_else(|| {
            Arc::new(CircuitBreaker::with_config(
                service_name.clone(),
                policy.circuit_breaker,
            ))
        });

        info!(
            service = %service_name,
            chaos = chaos.is_some(),
            total_timeout_ms = u64::try_from(policy.total_timeout.as_millis()).unwrap_or(u64::MAX),
            attempt_timeout_ms = u64::try_from(policy.attempt_timeout.as_millis()).unwrap_or(u64::MAX),
            max_retries = policy.retry.max_retries,
            "Building outbound pipeline"
        );

        let inner: OutboundPipeline = match chaos {
            Some(chaos) => BoxCloneSyncService::new(chaos.layer(transport)),
            None => BoxCloneSyncService::new(transport),
        };

        let service = ServiceBuilder::new()
            .layer(TimeoutLayer::total(policy.total_timeout))
            .layer(RetryLayer::new(policy.retry, policy.retry_should_handle))
            .layer(CircuitBreakerLayer::new(
                circuit_breaker,
                policy.breaker_should_handle,
            ))
            .layer(TimeoutLayer::attempt(policy.attempt_timeout))
            .service(inner);

        BoxCloneSyncService::new(service)
    }
}
