//! Outcome strategy: replaces the real result with a failure-shaped response.

use std::task::{Context, Poll};

use application::ApplicationError;
use futures::future::BoxFuture;
use reqwest::StatusCode;
use tower::{Layer, Service};

use super::{stats::ChaosStrategyKind, strategy::ChaosStrategyOptions};
use crate::http::{Outcome, OutboundRequest, TransportResponse};

/// Layer substituting the attempt's result with a designated status
///
/// The real call still runs; its result is discarded when the draw fires.
/// Cancellation is never masked.
#[derive(Debug, Clone)]
pub struct ChaosOutcomeLayer {
    options: ChaosStrategyOptions,
    status: StatusCode,
    enabled: bool,
}

impl ChaosOutcomeLayer {
    /// Create the layer
    #[must_use]
    pub const fn new(options: ChaosStrategyOptions, status: StatusCode, enabled: bool) -> Self {
        Self {
            options,
            status,
            enabled,
        }
    }
}

impl<S> Layer<S> for ChaosOutcomeLayer {
    type Service = ChaosOutcome<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ChaosOutcome {
            inner,
            options: self.options.clone(),
            status: self.status,
            enabled: self.enabled,
        }
    }
}

/// Service produced by [`ChaosOutcomeLayer`]
#[derive(Debug, Clone)]
pub struct ChaosOutcome<S> {
    inner: S,
    options: ChaosStrategyOptions,
    status: StatusCode,
    enabled: bool,
}

impl<S> Service<OutboundRequest> for ChaosOutcome<S>
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
        if !self.enabled {
            return Box::pin(self.inner.call(request));
        }

        let options = self.options.clone();
        let status = self.status;
        let context = request.context().clone();
        let call = self.inner.call(request);

        Box::pin(async move {
            let outcome = call.await;
            if matches!(outcome, Err(ApplicationError::Cancelled)) {
                return outcome;
            }
            if options.evaluate(ChaosStrategyKind::Outcome, &context).is_injected() {
                return Ok(TransportResponse::empty(status));
            }
            outcome
        })
    }
}
