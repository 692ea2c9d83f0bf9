//! Attempt and total timeouts.

use std::{
    fmt,
    task::{Context, Poll},
    time::Duration,
};

use application::ApplicationError;
use futures::future::BoxFuture;
use tower::{Layer, Service};
use tracing::warn;

use crate::http::{Outcome, OutboundRequest, TransportResponse};

/// Which budget a timeout layer enforces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutScope {
    /// One execution attempt, inside the retry loop
    Attempt,
    /// The whole call including every retry and backoff
    Total,
}

impl fmt::Display for TimeoutScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attempt => write!(f, "attempt"),
            Self::Total => write!(f, "total"),
        }
    }
}

/// Layer that fails a call with `ApplicationError::Timeout` once its budget is spent
///
/// The inner future is dropped on expiry, which aborts the in-flight request.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutLayer {
    timeout: Duration,
    scope: TimeoutScope,
}

impl TimeoutLayer {
    /// Timeout for a single attempt
    #[must_use]
    pub const fn attempt(timeout: Duration) -> Self {
        Self {
            timeout,
            scope: TimeoutScope::Attempt,
        }
    }

    /// Timeout for the whole call
    #[must_use]
    pub const fn total(timeout: Duration) -> Self {
        Self {
            timeout,
            scope: TimeoutScope::Total,
        }
    }
}

impl<S> Layer<S> for TimeoutLayer {
    type Service = Timeout<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Timeout {
            inner,
            timeout: self.timeout,
            scope: self.scope,
        }
    }
}

/// Service produced by [`TimeoutLayer`]
#[derive(Debug, Clone)]
pub struct Timeout<S> {
    inner: S,
    timeout: Duration,
    scope: TimeoutScope,
}

impl<S> Service<OutboundRequest> for Timeout<S>
where
    S: Service<OutboundRequest, Response = TransportResponse, Error = ApplicationError>
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
        let budget = self.timeout;
        let scope = self.scope;
        let operation = request.context().operation();
        let attempt = request.context().attempt();
        let call = self.inner.call(request);

        Box::pin(async move {
            if let Ok(outcome) = tokio::time::timeout(budget, call).await {
                outcome
            } else {
                warn!(
                    operation,
                    attempt,
                    scope = %scope,
                    timeout_ms = u64::try_from(budget.as_millis()).unwrap_or(u64::MAX),
                    "Outbound call timed out"
                );
                Err(ApplicationError::Timeout(budget))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use application::ExecutionContext;
    use reqwest::StatusCode;
    use tower::{ServiceExt, service_fn};

    use super::*;

    fn request() -> OutboundRequest {
        OutboundRequest::get("/todos", ExecutionContext::new("todos"))
    }

    #[tokio::test(start_paused = true)]
    async fn slow_attempt_times_out() {
        let slow = service_fn(|_req: OutboundRequest| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, ApplicationError>(TransportResponse::empty(StatusCode::OK))
        });
        let service = TimeoutLayer::attempt(Duration::from_secs(1)).layer(slow);

        let err = service.oneshot(request()).await.unwrap_err();

        assert!(matches!(err, ApplicationError::Timeout(d) if d == Duration::from_secs(1)));
        assert!(err.is_transient());
    }

    #[tokio::test(start_paused = true)]
    async fn fast_attempt_passes_through() {
        let fast = service_fn(|_req: OutboundRequest| async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, ApplicationError>(TransportResponse::empty(StatusCode::NO_CONTENT))
        });
        let service = TimeoutLayer::total(Duration::from_secs(1)).layer(fast);

        let response = service.oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test(start_paused = true)]
    async fn inner_errors_are_not_rewritten() {
        let failing = service_fn(|_req: OutboundRequest| async {
            Err::<TransportResponse, _>(ApplicationError::Decode("bad".into()))
        });
        let service = TimeoutLayer::attempt(Duration::from_secs(1)).layer(failing);

        let err = service.oneshot(request()).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Decode(_)));
    }

    #[test]
    fn scope_display() {
        assert_eq!(TimeoutScope::Attempt.to_string(), "attempt");
        assert_eq!(TimeoutScope::Total.to_string(), "total");
    }
}
