//! Latency strategy: delays the attempt, never alters its outcome.

use std::{
    task::{Context, Poll},
    time::Duration,
};

use application::ApplicationError;
use futures::future::BoxFuture;
use tower::{Layer, Service};

use super::{stats::ChaosStrategyKind, strategy::ChaosStrategyOptions};
use crate::http::{Outcome, OutboundRequest, TransportResponse};

/// Layer injecting a fixed delay before the attempt
#[derive(Debug, Clone)]
pub struct ChaosLatencyLayer {
    options: ChaosStrategyOptions,
    latency: Duration,
    enabled: bool,
}

impl ChaosLatencyLayer {
    /// Create the layer
    #[must_use]
    pub const fn new(options: ChaosStrategyOptions, latency: Duration, enabled: bool) -> Self {
        Self {
            options,
            latency,
            enabled,
        }
    }
}

impl<S> Layer<S> for ChaosLatencyLayer {
    type Service = ChaosLatency<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ChaosLatency {
            inner,
            options: self.options.clone(),
            latency: self.latency,
            enabled: self.enabled,
        }
    }
}

/// Service produced by [`ChaosLatencyLayer`]
#[derive(Debug, Clone)]
pub struct ChaosLatency<S> {
    inner: S,
    options: ChaosStrategyOptions,
    latency: Duration,
    enabled: bool,
}

impl<S> Service<OutboundRequest> for ChaosLatency<S>
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
        if !self.enabled
            || !self
                .options
                .evaluate(ChaosStrategyKind::Latency, request.context())
                .is_injected()
        {
            return Box::pin(self.inner.call(request));
        }

        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let latency = self.latency;
        let monitor = std::sync::Arc::clone(self.options.monitor());

        Box::pin(async move {
            tokio::select! {
                biased;
                () = request.context().cancellation().cancelled() => {
                    return Err(ApplicationError::Cancelled);
                },
                () = tokio::time::sleep(latency) => {},
            }
            monitor.record_latency(latency);
            inner.call(request).await
        })
    }
}
