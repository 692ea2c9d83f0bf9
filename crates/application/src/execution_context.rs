//! Per-call execution context
//!
//! An `ExecutionContext` is created once per outbound call and travels with
//! the request through every resilience and chaos layer. Retries clone it and
//! bump the attempt number; chaos strategies only read it.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::RequestContext;

/// Context of one outbound call
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    operation: &'static str,
    call_id: Uuid,
    request: Option<Arc<RequestContext>>,
    cancellation: CancellationToken,
    attempt: u32,
}

impl ExecutionContext {
    /// Create a context for the named operation
    #[must_use]
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            call_id: Uuid::now_v7(),
            request: None,
            cancellation: CancellationToken::new(),
            attempt: 1,
        }
    }

    /// Associate the inbound request that triggered this call
    #[must_use]
    pub fn with_request(mut self, request: RequestContext) -> Self {
        self.request = Some(Arc::new(request));
        self
    }

    /// Use the caller's cancellation token
    #[must_use]
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Copy of this context for the given attempt (1-based)
    #[must_use]
    pub fn for_attempt(&self, attempt: u32) -> Self {
        Self {
            attempt,
            ..self.clone()
        }
    }

    /// Name of the operation, used in logs
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        self.operation
    }

    /// Correlation id: the inbound request id if any, else a per-call id
    #[must_use]
    pub fn correlation_id(&self) -> Uuid {
        self.request
            .as_ref()
            .map_or(self.call_id, |request| request.request_id())
    }

    /// Inbound request metadata, if the call was triggered by one
    #[must_use]
    pub fn request(&self) -> Option<&RequestContext> {
        self.request.as_deref()
    }

    /// Query parameter of the inbound request
    #[must_use]
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.request().and_then(|request| request.query_param(key))
    }

    /// Cancellation token of the call
    #[must_use]
    pub const fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Returns true once the caller cancelled
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Current attempt number (1-based)
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_first_attempt() {
        let ctx = ExecutionContext::new("todos");
        assert_eq!(ctx.attempt(), 1);
        assert_eq!(ctx.operation(), "todos");
        assert!(ctx.request().is_none());
    }

    #[test]
    fn for_attempt_keeps_identity() {
        let ctx = ExecutionContext::new("todos");
        let retry = ctx.for_attempt(3);
        assert_eq!(retry.attempt(), 3);
        assert_eq!(retry.correlation_id(), ctx.correlation_id());
    }

    #[test]
    fn correlation_id_prefers_inbound_request() {
        let request = RequestContext::new();
        let request_id = request.request_id();
        let ctx = ExecutionContext::new("todos").with_request(request);
        assert_eq!(ctx.correlation_id(), request_id);
    }

    #[test]
    fn query_param_reads_inbound_request() {
        let ctx = ExecutionContext::new("todos")
            .with_request(RequestContext::new().with_query_param("user", "test"));
        assert_eq!(ctx.query_param("user"), Some("test"));
        assert_eq!(ExecutionContext::new("todos").query_param("user"), None);
    }

    #[test]
    fn cancellation_is_shared_between_attempts() {
        let token = CancellationToken::new();
        let ctx = ExecutionContext::new("todos").with_cancellation(token.clone());
        let attempt = ctx.for_attempt(2);
        token.cancel();
        assert!(ctx.is_cancelled());
        assert!(attempt.is_cancelled());
    }
}
