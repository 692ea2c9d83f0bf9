//! Resilience policies for outbound calls
//!
//! Every policy is a tower [`Layer`](tower::Layer) over the same request and
//! error types, composed by [`OutboundPipelineBuilder`] in a fixed order
//! (outermost first):
//!
//! 1. total timeout
//! 2. retry with exponential backoff
//! 3. circuit breaker
//! 4. attempt timeout
//! 5. chaos strategies (see [`crate::chaos`])
//! 6. HTTP transport
//!
//! Retry and circuit breaker share one [`OutcomePredicate`]: transport
//! errors, timeouts, 5xx/408/429 responses and the synthetic fault.

mod circuit_breaker;
mod classification;
mod pipeline;
mod retry;
mod timeout;

pub use circuit_breaker::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerLayer, CircuitBreakerService,
    CircuitBreakerSnapshot, CircuitPermit, CircuitState,
};
pub use classification::{OutcomeClass, OutcomePredicate};
pub use pipeline::{OutboundPipeline, OutboundPipelineBuilder, ResiliencePolicyConfig};
pub use retry::{Retry, RetryConfig, RetryLayer};
pub use timeout::{Timeout, TimeoutLayer, TimeoutScope};
