//! Integration tests for HTTP handlers
#![allow(clippy::expect_used)]

use std::sync::{Arc, Mutex};

use application::{ApplicationError, RequestContext, TodoService, ports::TodosPort};
use async_trait::async_trait;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use domain::{Environment, InjectionRate, TodoItem};
use infrastructure::{
    AppConfig, ChaosMonitor, CircuitBreaker, CircuitBreakerConfig, RetryConfig, TodosAdapter,
    resilience::OutcomeClass,
};
use presentation_http::{routes::create_router, state::AppState};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

const REQUEST_ID: &str = "x-request-id";

/// Todos port returning a fixed result and recording the requests it saw
struct StubTodos {
    result: fn() -> Result<Vec<TodoItem>, ApplicationError>,
    seen: Mutex<Vec<RequestContext>>,
}

impl StubTodos {
    fn returning(result: fn() -> Result<Vec<TodoItem>, ApplicationError>) -> Arc<Self> {
        Arc::new(Self {
            result,
            seen: Mutex::new(Vec::new()),
        })
    }

    fn seen(&self) -> Vec<RequestContext> {
        self.seen.lock().expect("lock").clone()
    }
}

#[async_trait]
impl TodosPort for StubTodos {
    async fn fetch_todos(
        &self,
        request: Option<RequestContext>,
        _cancellation: CancellationToken,
    ) -> Result<Vec<TodoItem>, ApplicationError> {
        if let Some(request) = request {
            self.seen.lock().expect("lock").push(request);
        }
        (self.result)()
    }
}

fn one_todo() -> Result<Vec<TodoItem>, ApplicationError> {
    Ok(vec![
        serde_json::from_str(r#"{"id":1,"title":"a","completed":false}"#).expect("todo"),
    ])
}

fn create_test_state(port: Arc<StubTodos>) -> AppState {
    AppState {
        todo_service: Arc::new(TodoService::new(port)),
        circuit_breaker: Arc::new(CircuitBreaker::with_config(
            "todos",
            CircuitBreakerConfig::sensitive(),
        )),
        chaos_monitor: Arc::new(ChaosMonitor::new()),
    }
}

fn create_test_server(state: AppState) -> TestServer {
    TestServer::new(create_router(state)).expect("Failed to create test server")
}

// ============ Health Endpoint Tests ============

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let server = create_test_server(create_test_state(StubTodos::returning(one_todo)));

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn resilience_endpoint_reports_closed_circuit() {
    let server = create_test_server(create_test_state(StubTodos::returning(one_todo)));

    let response = server.get("/health/resilience").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["ready"], true);
    assert_eq!(body["circuit"]["name"], "todos");
    assert_eq!(body["circuit"]["state"], "closed");
    assert_eq!(body["chaos"]["evaluations"], 0);
}

#[tokio::test]
async fn resilience_endpoint_unavailable_when_circuit_open() {
    let state = create_test_state(StubTodos::returning(one_todo));
    for _ in 0..5 {
        state
            .circuit_breaker
            .try_acquire()
            .expect("closed circuit admits calls")
            .settle(OutcomeClass::Handled);
    }
    let server = create_test_server(state);

    let response = server.get("/health/resilience").await;

    response.assert_status_service_unavailable();
    let body: serde_json::Value = response.json();
    assert_eq!(body["ready"], false);
    assert_eq!(body["circuit"]["state"], "open");
}

// ============ Todos Endpoint Tests ============

#[tokio::test]
async fn todos_endpoint_returns_items() {
    let server = create_test_server(create_test_state(StubTodos::returning(one_todo)));

    let response = server.get("/").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["id"], 1);
    assert_eq!(body[0]["title"], "a");
    assert_eq!(body[0]["completed"], false);
}

#[tokio::test]
async fn todos_endpoint_forwards_query_and_request_id() {
    let port = StubTodos::returning(one_todo);
    let server = create_test_server(create_test_state(Arc::clone(&port)));
    let request_id = Uuid::now_v7();

    let response = server
        .get("/")
        .add_query_param("user", "test")
        .add_header(
            HeaderName::from_static(REQUEST_ID),
            HeaderValue::from_str(&request_id.to_string()).expect("header"),
        )
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.header(REQUEST_ID).to_str().expect("ascii"),
        request_id.to_string()
    );

    let seen = port.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].request_id(), request_id);
    assert_eq!(seen[0].query_param("user"), Some("test"));
}

#[tokio::test]
async fn todos_endpoint_generates_request_id() {
    let server = create_test_server(create_test_state(StubTodos::returning(one_todo)));

    let response = server.get("/").await;

    let header = response.header(REQUEST_ID);
    assert!(Uuid::parse_str(header.to_str().expect("ascii")).is_ok());
}

#[tokio::test]
async fn circuit_open_maps_to_service_unavailable() {
    let server = create_test_server(create_test_state(StubTodos::returning(|| {
        Err(ApplicationError::CircuitOpen {
            service_name: "todos".to_string(),
        })
    })));

    let response = server.get("/").await;

    response.assert_status_service_unavailable();
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "circuit_open");
}

#[tokio::test]
async fn timeout_maps_to_gateway_timeout() {
    let server = create_test_server(create_test_state(StubTodos::returning(|| {
        Err(ApplicationError::Timeout(std::time::Duration::from_secs(1)))
    })));

    let response = server.get("/").await;

    response.assert_status(StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn upstream_status_maps_to_bad_gateway() {
    let server = create_test_server(create_test_state(StubTodos::returning(|| {
        Err(ApplicationError::UnexpectedStatus(500))
    })));

    let response = server.get("/").await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "bad_gateway");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let server = create_test_server(create_test_state(StubTodos::returning(one_todo)));

    let response = server.get("/todos").await;

    response.assert_status_not_found();
}

// ============ Full Stack Tests ============

fn forced_fault_config(environment: Environment) -> AppConfig {
    let mut config = AppConfig::default();
    config.environment = environment;
    config.todos.base_url = "http://127.0.0.1:9".to_string();
    config.chaos.development_rate = InjectionRate::ALWAYS;
    config.chaos.production_rate = InjectionRate::ALWAYS;
    config.chaos.latency_enabled = false;
    config.chaos.outcome_enabled = false;
    config.resilience.retry = RetryConfig::fast().without_jitter();
    config
}

fn create_full_stack_server(config: &AppConfig) -> TestServer {
    let todos = TodosAdapter::from_config(config).expect("valid config");
    create_test_server(AppState {
        todo_service: Arc::new(TodoService::new(Arc::new(todos.adapter))),
        circuit_breaker: todos.circuit_breaker,
        chaos_monitor: todos.chaos_monitor,
    })
}

#[tokio::test]
async fn forced_fault_surfaces_as_bad_gateway_and_is_counted() {
    let server = create_full_stack_server(&forced_fault_config(Environment::Development));

    let response = server.get("/").await;
    response.assert_status(StatusCode::BAD_GATEWAY);

    let stats: serde_json::Value = server.get("/health/resilience").await.json();
    assert_eq!(stats["chaos"]["faults_injected"], 4);
    assert_eq!(stats["circuit"]["window_failures"], 4);
}

#[tokio::test]
async fn production_marker_key_matches_any_case() {
    let server = create_full_stack_server(&forced_fault_config(Environment::Production));

    let response = server.get("/").add_query_param("User", "test").await;
    response.assert_status(StatusCode::BAD_GATEWAY);

    let stats: serde_json::Value = server.get("/health/resilience").await.json();
    assert_eq!(stats["chaos"]["faults_injected"], 4);
}

#[tokio::test]
async fn production_marker_with_repeated_key_keeps_chaos_off() {
    let server = create_full_stack_server(&forced_fault_config(Environment::Production));

    // chaos stays off, so the unreachable downstream is what fails
    let response = server
        .get("/")
        .add_query_params(&[("user", "alice"), ("user", "test")])
        .await;
    response.assert_status(StatusCode::BAD_GATEWAY);

    let stats: serde_json::Value = server.get("/health/resilience").await.json();
    assert_eq!(stats["chaos"]["faults_injected"], 0);
    assert_eq!(stats["chaos"]["evaluations"], stats["chaos"]["evaluations_skipped"]);
}
