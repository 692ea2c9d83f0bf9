//! Fault strategy: raises the synthetic error instead of running the attempt.

use std::task::{Context, Poll};

use application::ApplicationError;
use futures::future::BoxFuture;
use tower::{Layer, Service};

use super::{stats::ChaosStrategyKind, strategy::ChaosStrategyOptions};
use crate::http::{Outcome, OutboundRequest, TransportResponse};

/// Message of the synthetic fault
pub const DEFAULT_FAULT_MESSAGE: &str = "Chaos strategy injection!";

/// Layer short-circuiting the attempt with `ApplicationError::InvalidOperation`
#[derive(Debug, Clone)]
pub struct ChaosFaultLayer {
    options: ChaosStrategyOptions,
    message: String,
    enabled: bool,
}

impl ChaosFaultLayer {
    /// Create the layer
    #[must_use]
    pub fn new(options: ChaosStrategyOptions, message: impl Into<String>, enabled: bool) -> Self {
        Self {
            options,
            message: message.into(),
            enabled,
        }
    }
}

impl<S> Layer<S> for ChaosFaultLayer {
    type Service = ChaosFault<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ChaosFault {
            inner,
            options: self.options.clone(),
            message: self.message.clone(),
            enabled: self.enabled,
        }
    }
}

/// Service produced by [`ChaosFaultLayer`]
#[derive(Debug, Clone)]
pub struct ChaosFault<S> {
    inner: S,
    options: ChaosStrategyOptions,
    message: String,
    enabled: bool,
}

impl<S> Service<OutboundRequest> for ChaosFault<S>
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
        if self.enabled
            && self
                .options
                .evaluate(ChaosStrategyKind::Fault, request.context())
                .is_injected()
        {
            let fault = ApplicationError::InvalidOperation(self.message.clone());
            return Box::pin(futures::future::ready(Err(fault)));
        }

        Box::pin(self.inner.call(request))
    }
}
