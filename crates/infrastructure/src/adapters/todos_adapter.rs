//! Todos adapter - Implements TodosPort through the resilient outbound pipeline

use std::{fmt, sync::Arc};

use application::{ApplicationError, ExecutionContext, RequestContext, ports::TodosPort};
use async_trait::async_trait;
use domain::TodoItem;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use tracing::{debug, instrument};

use crate::{
    chaos::{ChaosLayer, ChaosMonitor, ChaosStrategyOptions, EnvironmentChaosManager},
    config::AppConfig,
    http::{HttpTransport, OutboundRequest},
    resilience::{CircuitBreaker, OutboundPipeline, OutboundPipelineBuilder},
};

/// Name of the todos destination in logs and circuit-open errors
pub const TODOS_SERVICE: &str = "todos";

/// Typed client for the downstream todos API
#[derive(Clone)]
pub struct TodosAdapter {
    pipeline: OutboundPipeline,
    path: String,
}

impl fmt::Debug for TodosAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TodosAdapter")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// A todos adapter together with the shared state of its pipeline
#[derive(Debug, Clone)]
pub struct ResilientTodos {
    /// The adapter
    pub adapter: TodosAdapter,
    /// Breaker guarding the todos destination
    pub circuit_breaker: Arc<CircuitBreaker>,
    /// Counters of the chaos strategies
    pub chaos_monitor: Arc<ChaosMonitor>,
}

impl TodosAdapter {
    /// Create an adapter over an already composed pipeline
    #[must_use]
    pub fn new(pipeline: OutboundPipeline, path: impl Into<String>) -> Self {
        Self {
            pipeline,
            path: path.into(),
        }
    }

    /// Wire transport, chaos and resilience from configuration
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Configuration` if the HTTP client or the
    /// chaos settings are invalid.
    pub fn from_config(config: &AppConfig) -> Result<ResilientTodos, ApplicationError> {
        let transport = HttpTransport::new(&config.todos.to_transport_config())?;

        let manager = EnvironmentChaosManager::new(
            config.chaos.to_manager_config(config.environment.clone()),
        );
        let options = ChaosStrategyOptions::new(Arc::new(manager));
        let chaos = ChaosLayer::new(&config.chaos.to_pipeline_config()?, &options);
        let chaos_monitor = Arc::clone(chaos.monitor());

        let policy = config.resilience.to_policy_config();
        let circuit_breaker = Arc::new(CircuitBreaker::with_config(
            TODOS_SERVICE,
            policy.circuit_breaker,
        ));

        let pipeline = OutboundPipelineBuilder::new(TODOS_SERVICE)
            .with_policy(policy)
            .with_chaos(chaos)
            .with_circuit_breaker(Arc::clone(&circuit_breaker))
            .build(transport);

        Ok(ResilientTodos {
            adapter: Self::new(pipeline, config.todos.path.clone()),
            circuit_breaker,
            chaos_monitor,
        })
    }

    /// Fetch all todos
    ///
    /// An empty body or JSON `null` yields an empty list. A non-success status
    /// that survives the pipeline becomes `UnexpectedStatus`.
    #[instrument(skip(self, request, cancellation))]
    pub async fn fetch(
        &self,
        request: Option<RequestContext>,
        cancellation: CancellationToken,
    ) -> Result<Vec<TodoItem>, ApplicationError> {
        let mut context = ExecutionContext::new(TODOS_SERVICE).with_cancellation(cancellation);
        if let Some(request) = request {
            context = context.with_request(request);
        }

        let response = self
            .pipeline
            .clone()
            .oneshot(OutboundRequest::get(self.path.clone(), context))
            .await?;

        if !response.is_success() {
            return Err(ApplicationError::UnexpectedStatus(response.status().as_u16()));
        }

        let todos = decode_todos(response.body())?;
        debug!(count = todos.len(), "Fetched todos");
        Ok(todos)
    }
}

fn decode_todos(body: &[u8]) -> Result<Vec<TodoItem>, ApplicationError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    serde_json::from_slice::<Option<Vec<TodoItem>>>(body)
        .map(Option::unwrap_or_default)
        .map_err(|e| ApplicationError::Decode(e.to_string()))
}

#[async_trait]
impl TodosPort for TodosAdapter {
    async fn fetch_todos(
        &self,
        request: Option<RequestContext>,
        cancellation: CancellationToken,
    ) -> Result<Vec<TodoItem>, ApplicationError> {
        self.fetch(request, cancellation).await
    }
}
