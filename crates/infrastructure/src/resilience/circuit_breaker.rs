//! Circuit breaker pattern for outbound calls
//!
//! Prevents cascading failures when a downstream service keeps failing.
//! Failures are measured as a ratio over a rolling sampling window rather
//! than as a consecutive count.
//!
//! # States
//!
//! - **Closed**: Normal operation, requests pass through
//! - **Open**: Service is down, requests fail fast without calling the service
//! - **Half-Open**: A single probe is let through to test recovery
//!
//! # Example
//!
//! ```rust,ignore
//! use infrastructure::resilience::{CircuitBreaker, CircuitBreakerLayer, OutcomePredicate};
//!
//! let breaker = Arc::new(CircuitBreaker::new("todos"));
//! let service = ServiceBuilder::new()
//!     .layer(CircuitBreakerLayer::new(Arc::clone(&breaker), OutcomePredicate::default()))
//!     .service(transport);
//! ```

use std::{
    collections::VecDeque,
    fmt,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};

use application::ApplicationError;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tower::{Layer, Service};
use tracing::{debug, info, warn};

use super::classification::{OutcomeClass, OutcomePredicate};
use crate::http::{Outcome, OutboundRequest, TransportResponse};

/// Configuration for a circuit breaker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircuitBreakerConfig {
    /// Failure ratio within the sampling window that opens the circuit
    pub failure_ratio: f64,
    /// Minimum number of calls in the window before the ratio is considered
    pub minimum_throughput: u32,
    /// Length of the rolling sampling window
    pub sampling_duration: Duration,
    /// How long the circuit stays open before a probe is allowed
    pub break_duration: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_ratio: 0.1,
            minimum_throughput: 100,
            sampling_duration: Duration::from_secs(30),
            break_duration: Duration::from_secs(5),
        }
    }
}

impl CircuitBreakerConfig {
    /// Creates a configuration for a sensitive/critical service (trips quickly)
    #[must_use]
    pub const fn sensitive() -> Self {
        Self {
            failure_ratio: 0.5,
            minimum_throughput: 5,
            sampling_duration: Duration::from_secs(10),
            break_duration: Duration::from_secs(5),
        }
    }

    /// Creates a custom configuration
    #[must_use]
    pub const fn custom(
        failure_ratio: f64,
        minimum_throughput: u32,
        sampling_duration: Duration,
        break_duration: Duration,
    ) -> Self {
        Self {
            failure_ratio,
            minimum_throughput,
            sampling_duration,
            break_duration,
        }
    }
}

/// State of a circuit breaker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Normal operation, requests pass through
    Closed,
    /// Service is down, requests fail fast
    Open,
    /// Testing if the service has recovered
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half-open"),
        }
    }
}

/// Point-in-time view of a circuit breaker, for health reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitBreakerSnapshot {
    /// Name of the protected destination
    pub name: String,
    /// Current state
    pub state: CircuitState,
    /// Calls recorded in the current sampling window
    pub window_calls: u32,
    /// Failures recorded in the current sampling window
    pub window_failures: u32,
    /// Number of times the circuit has opened
    pub times_opened: u64,
}

/// Rolling window of call results
#[derive(Debug, Default)]
struct HealthWindow {
    samples: VecDeque<(Instant, bool)>,
    failures: u32,
}

impl HealthWindow {
    fn prune(&mut self, now: Instant, sampling: Duration) {
        while let Some(&(at, failed)) = self.samples.front() {
            if now.duration_since(at) < sampling {
                break;
            }
            self.samples.pop_front();
            if failed {
                self.failures -= 1;
            }
        }
    }

    fn record(&mut self, now: Instant, failed: bool) {
        self.samples.push_back((now, failed));
        if failed {
            self.failures += 1;
        }
    }

    fn total(&self) -> u32 {
        u32::try_from(self.samples.len()).unwrap_or(u32::MAX)
    }

    #[allow(clippy::cast_precision_loss)]
    fn failure_ratio(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            f64::from(self.failures) / f64::from(total)
        }
    }

    fn clear(&mut self) {
        self.samples.clear();
        self.failures = 0;
    }
}

#[derive(Debug)]
struct CircuitBreakerState {
    state: CircuitState,
    window: HealthWindow,
    opened_at: Option<Instant>,
    probe_in_flight: bool,
    times_opened: u64,
}

impl CircuitBreakerState {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            window: HealthWindow::default(),
            opened_at: None,
            probe_in_flight: false,
            times_opened: 0,
        }
    }
}

/// Circuit breaker shared by every call to one destination
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    state: Mutex<CircuitBreakerState>,
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("state", &self.state.lock().state)
            .finish()
    }
}

/// Permission to execute one call through the breaker
///
/// Dropping a permit without settling it releases a half-open probe slot so
/// a cancelled probe cannot leave the circuit stuck.
#[derive(Debug)]
pub struct CircuitPermit {
    breaker: Arc<CircuitBreaker>,
    probe: bool,
    settled: bool,
}

impl CircuitPermit {
    /// Returns true if this call is the half-open probe
    #[must_use]
    pub const fn is_probe(&self) -> bool {
        self.probe
    }

    /// Record the classified outcome of the call
    pub fn settle(mut self, class: OutcomeClass) {
        self.settled = true;
        self.breaker.record(self.probe, class);
    }
}

impl Drop for CircuitPermit {
    fn drop(&mut self) {
        if !self.settled && self.probe {
            self.breaker.record(true, OutcomeClass::Unhandled);
        }
    }
}

impl CircuitBreaker {
    /// Creates a new circuit breaker with default configuration
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, CircuitBreakerConfig::default())
    }

    /// Creates a new circuit breaker with custom configuration
    #[must_use]
    pub fn with_config(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            state: Mutex::new(CircuitBreakerState::new()),
        }
    }

    /// Returns the name of this circuit breaker
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the configuration
    #[must_use]
    pub const fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Returns the current state of the circuit breaker
    ///
    /// An open circuit whose break duration has elapsed reports `HalfOpen`.
    #[must_use]
    pub fn state(&self) -> CircuitState {
        let mut state = self.state.lock();
        self.refresh(&mut state, Instant::now());
        state.state
    }

    /// Returns true if the circuit is closed (normal operation)
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state() == CircuitState::Closed
    }

    /// Returns true if the circuit is open (service unavailable)
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state() == CircuitState::Open
    }

    /// Current state and window counters
    #[must_use]
    pub fn snapshot(&self) -> CircuitBreakerSnapshot {
        let mut state = self.state.lock();
        let now = Instant::now();
        self.refresh(&mut state, now);
        state.window.prune(now, self.config.sampling_duration);
        CircuitBreakerSnapshot {
            name: self.name.clone(),
            state: state.state,
            window_calls: state.window.total(),
            window_failures: state.window.failures,
            times_opened: state.times_opened,
        }
    }

    fn refresh(&self, state: &mut CircuitBreakerState, now: Instant) {
        if state.state != CircuitState::Open {
            return;
        }
        if let Some(opened_at) = state.opened_at {
            let elapsed = now.duration_since(opened_at);
            if elapsed >= self.config.break_duration {
                debug!(
                    service = %self.name,
                    elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                    "Circuit transitioning from Open to HalfOpen"
                );
                state.state = CircuitState::HalfOpen;
                state.probe_in_flight = false;
            }
        }
    }

    fn circuit_open_error(&self) -> ApplicationError {
        ApplicationError::CircuitOpen {
            service_name: self.name.clone(),
        }
    }

    /// Ask for permission to execute a call
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::CircuitOpen` while the circuit is open or a
    /// half-open probe is already in flight.
    pub fn try_acquire(self: &Arc<Self>) -> Result<CircuitPermit, ApplicationError> {
        let mut state = self.state.lock();
        self.refresh(&mut state, Instant::now());

        let probe = match state.state {
            CircuitState::Closed => false,
            CircuitState::Open => {
                warn!(service = %self.name, state = %state.state, "Circuit breaker preventing call to service");
                return Err(self.circuit_open_error());
            },
            CircuitState::HalfOpen => {
                if state.probe_in_flight {
                    warn!(service = %self.name, state = %state.state, "Probe already in flight, failing fast");
                    return Err(self.circuit_open_error());
                }
                state.probe_in_flight = true;
                debug!(service = %self.name, "Letting probe through half-open circuit");
                true
            },
        };

        Ok(CircuitPermit {
            breaker: Arc::clone(self),
            probe,
            settled: false,
        })
    }

    fn trip(&self, state: &mut CircuitBreakerState, now: Instant) {
        state.state = CircuitState::Open;
        state.opened_at = Some(now);
        state.probe_in_flight = false;
        state.times_opened += 1;
        state.window.clear();
    }

    fn record(&self, probe: bool, class: OutcomeClass) {
        let mut state = self.state.lock();
        let now = Instant::now();

        if probe {
            state.probe_in_flight = false;
            if state.state != CircuitState::HalfOpen {
                return;
            }
            match class {
                OutcomeClass::Success => {
                    info!(service = %self.name, "Circuit transitioning from HalfOpen to Closed");
                    state.state = CircuitState::Closed;
                    state.opened_at = None;
                    state.window.clear();
                },
                OutcomeClass::Handled => {
                    warn!(service = %self.name, "Circuit transitioning from HalfOpen to Open after failure");
                    self.trip(&mut state, now);
                },
                OutcomeClass::Unhandled => {},
            }
            return;
        }

        if state.state != CircuitState::Closed {
            return;
        }

        let failed = match class {
            OutcomeClass::Success => false,
            OutcomeClass::Handled => true,
            OutcomeClass::Unhandled => return,
        };

        state.window.prune(now, self.config.sampling_duration);
        state.window.record(now, failed);

        if failed
            && state.window.total() >= self.config.minimum_throughput
            && state.window.failure_ratio() >= self.config.failure_ratio
        {
            warn!(
                service = %self.name,
                failures = state.window.failures,
                calls = state.window.total(),
                "Circuit transitioning from Closed to Open"
            );
            self.trip(&mut state, now);
        }
    }
}

/// Layer that guards the inner service with a shared [`CircuitBreaker`]
#[derive(Debug, Clone)]
pub struct CircuitBreakerLayer {
    breaker: Arc<CircuitBreaker>,
    should_handle: OutcomePredicate,
}

impl CircuitBreakerLayer {
    /// Create a layer around an existing breaker
    #[must_use]
    pub const fn new(breaker: Arc<CircuitBreaker>, should_handle: OutcomePredicate) -> Self {
        Self {
            breaker,
            should_handle,
        }
    }
}

impl<S> Layer<S> for CircuitBreakerLayer {
    type Service = CircuitBreakerService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CircuitBreakerService {
            inner,
            breaker: Arc::clone(&self.breaker),
            should_handle: self.should_handle.clone(),
        }
    }
}

/// Service produced by [`CircuitBreakerLayer`]
#[derive(Debug, Clone)]
pub struct CircuitBreakerService<S> {
    inner: S,
    breaker: Arc<CircuitBreaker>,
    should_handle: OutcomePredicate,
}

impl<S> Service<OutboundRequest> for CircuitBreakerService<S>
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
        let permit = match self.breaker.try_acquire() {
            Ok(permit) => permit,
            Err(e) => return Box::pin(futures::future::ready(Err(e))),
        };
        let should_handle = self.should_handle.clone();
        let call = self.inner.call(request);

        Box::pin(async move {
            let outcome = call.await;
            permit.settle(should_handle.classify(&outcome));
            outcome
        })
    }
}
