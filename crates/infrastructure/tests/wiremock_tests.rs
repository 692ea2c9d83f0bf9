//! Integration tests for the todos pipeline
//!
//! Tests cover:
//! - Decoding of the downstream payload end to end
//! - Retry and circuit breaker against a mocked downstream
//! - Chaos decisions driven by environment and the override marker
//! - Correlation id propagation, timeouts and cancellation

use std::time::Duration;

use application::{ApplicationError, RequestContext};
use domain::{Environment, InjectionRate};
use infrastructure::{
    AppConfig, CircuitState, ResilientTodos, RetryConfig, TodosAdapter, X_REQUEST_ID,
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(server: &MockServer) -> AppConfig {
    let mut config = AppConfig::default();
    config.todos.base_url = server.uri();
    config.resilience.retry = RetryConfig::fast().without_jitter();
    config.resilience.attempt_timeout_ms = 2_000;
    config
}

fn wire(config: &AppConfig) -> ResilientTodos {
    TodosAdapter::from_config(config).unwrap()
}

async fn fetch(todos: &ResilientTodos) -> Result<Vec<domain::TodoItem>, ApplicationError> {
    todos.adapter.fetch(None, CancellationToken::new()).await
}

// ============================================================================
// Decoding
// ============================================================================

mod decoding_tests {
    use super::*;

    #[tokio::test]
    async fn single_item_array_decodes_exactly() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/todos"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(r#"[{"id":1,"title":"a","completed":false}]"#, "application/json"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let todos = fetch(&wire(&test_config(&server))).await.unwrap();

        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].id, 1);
        assert_eq!(todos[0].title, "a");
        assert!(!todos[0].completed);
    }

    #[tokio::test]
    async fn null_body_is_empty_sequence() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/todos"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("null", "application/json"))
            .mount(&server)
            .await;

        let todos = fetch(&wire(&test_config(&server))).await.unwrap();
        assert!(todos.is_empty());
    }

    #[tokio::test]
    async fn empty_body_is_empty_sequence() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/todos"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let todos = fetch(&wire(&test_config(&server))).await.unwrap();
        assert!(todos.is_empty());
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/todos"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{oops"))
            .expect(1)
            .mount(&server)
            .await;

        let err = fetch(&wire(&test_config(&server))).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Decode(_)));
    }
}

// ============================================================================
// Retry and circuit breaker
// ============================================================================

mod resilience_tests {
    use super::*;

    #[tokio::test]
    async fn transient_failures_are_retried_until_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/todos"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/todos"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("[]", "application/json"))
            .expect(1)
            .mount(&server)
            .await;

        let todos = fetch(&wire(&test_config(&server))).await.unwrap();
        assert!(todos.is_empty());
    }

    #[tokio::test]
    async fn persistent_server_error_surfaces_after_all_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/todos"))
            .respond_with(ResponseTemplate::new(500))
            .expect(4)
            .mount(&server)
            .await;

        let err = fetch(&wire(&test_config(&server))).await.unwrap_err();
        assert!(matches!(err, ApplicationError::UnexpectedStatus(500)));
    }

    #[tokio::test]
    async fn client_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/todos"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let err = fetch(&wire(&test_config(&server))).await.unwrap_err();
        assert!(matches!(err, ApplicationError::UnexpectedStatus(404)));
    }

    #[tokio::test]
    async fn breaker_opens_and_fails_fast() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/todos"))
            .respond_with(ResponseTemplate::new(500))
            .expect(4)
            .mount(&server)
            .await;

        let mut config = test_config(&server);
        config.resilience.circuit_breaker.minimum_throughput = 4;
        config.resilience.circuit_breaker.failure_ratio = 0.5;
        let todos = wire(&config);

        let first = fetch(&todos).await.unwrap_err();
        assert!(matches!(first, ApplicationError::UnexpectedStatus(500)));
        assert_eq!(todos.circuit_breaker.state(), CircuitState::Open);

        let second = fetch(&todos).await.unwrap_err();
        assert!(matches!(
            second,
            ApplicationError::CircuitOpen { ref service_name } if service_name == "todos"
        ));
    }

    #[tokio::test]
    async fn slow_downstream_hits_attempt_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/todos"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let mut config = test_config(&server);
        config.resilience.attempt_timeout_ms = 100;
        config.resilience.retry.max_retries = 1;

        let err = fetch(&wire(&config)).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Timeout(d) if d == Duration::from_millis(100)));
    }

    #[tokio::test]
    async fn cancellation_is_reported_as_cancelled() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/todos"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let todos = wire(&test_config(&server));
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let err = todos.adapter.fetch(None, token).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Cancelled));
    }
}

// ============================================================================
// Chaos decisions
// ============================================================================

mod chaos_tests {
    use super::*;

    fn forced(server: &MockServer, environment: Environment) -> AppConfig {
        let mut config = test_config(server);
        config.environment = environment;
        config.chaos.development_rate = InjectionRate::ALWAYS;
        config.chaos.production_rate = InjectionRate::ALWAYS;
        config.chaos.latency_enabled = false;
        config
    }

    #[tokio::test]
    async fn forced_fault_in_development_never_reaches_downstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let todos = wire(&forced(&server, Environment::Development));
        let err = fetch(&todos).await.unwrap_err();

        assert!(
            matches!(err, ApplicationError::InvalidOperation(ref m) if m == "Chaos strategy injection!")
        );
        let stats = todos.chaos_monitor.snapshot();
        assert_eq!(stats.faults_injected, 4);
        assert_eq!(stats.outcomes_injected, 0);
    }

    #[tokio::test]
    async fn forced_outcome_with_override_marker_in_production() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/todos"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("[]", "application/json"))
            .expect(4)
            .mount(&server)
            .await;

        let mut config = forced(&server, Environment::Production);
        config.chaos.fault_enabled = false;
        let todos = wire(&config);
        let request = RequestContext::new().with_query_param("user", "test");

        let err = todos
            .adapter
            .fetch(Some(request), CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::UnexpectedStatus(500)));
        assert_eq!(todos.chaos_monitor.snapshot().outcomes_injected, 4);
    }

    #[tokio::test]
    async fn production_without_marker_is_untouched() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/todos"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(r#"[{"id":7,"title":"b","completed":true}]"#, "application/json"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let todos = wire(&forced(&server, Environment::Production));
        let result = fetch(&todos).await.unwrap();

        assert_eq!(result.len(), 1);
        assert!(result[0].completed);
        assert_eq!(todos.chaos_monitor.snapshot().total_injected(), 0);
    }

    #[tokio::test]
    async fn unclassified_environment_never_injects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/todos"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("[]", "application/json"))
            .expect(3)
            .mount(&server)
            .await;

        let todos = wire(&forced(&server, Environment::classify("staging")));
        let request = RequestContext::new().with_query_param("user", "test");
        for _ in 0..3 {
            todos
                .adapter
                .fetch(Some(request.clone()), CancellationToken::new())
                .await
                .unwrap();
        }

        assert_eq!(todos.chaos_monitor.snapshot().total_injected(), 0);
    }
}

// ============================================================================
// Correlation
// ============================================================================

mod correlation_tests {
    use super::*;

    #[tokio::test]
    async fn inbound_request_id_is_propagated() {
        let server = MockServer::start().await;
        let request_id = Uuid::now_v7();
        Mock::given(method("GET"))
            .and(path("/todos"))
            .and(header(X_REQUEST_ID, request_id.to_string().as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_raw("[]", "application/json"))
            .expect(1)
            .mount(&server)
            .await;

        let todos = wire(&test_config(&server));
        todos
            .adapter
            .fetch(
                Some(RequestContext::with_request_id(request_id)),
                CancellationToken::new(),
            )
            .await
            .unwrap();
    }
}
