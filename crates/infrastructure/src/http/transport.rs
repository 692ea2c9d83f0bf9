use std::{
    fmt,
    task::{Context, Poll},
    time::Duration,
};

use application::{ApplicationError, ExecutionContext};
use bytes::Bytes;
use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode};
use tower::Service;
use tracing::{debug, instrument};

/// Header name for request correlation ID
pub const X_REQUEST_ID: &str = "x-request-id";

/// What every layer of the outbound pipeline produces
pub type Outcome = Result<TransportResponse, ApplicationError>;

/// A request travelling through the outbound pipeline
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    method: Method,
    path: String,
    context: ExecutionContext,
}

impl OutboundRequest {
    /// Create a request with an explicit method
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>, context: ExecutionContext) -> Self {
        Self {
            method,
            path: path.into(),
            context,
        }
    }

    /// Create a GET request
    #[must_use]
    pub fn get(path: impl Into<String>, context: ExecutionContext) -> Self {
        Self::new(Method::GET, path, context)
    }

    /// HTTP method
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Path relative to the transport's base URL
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Execution context of the call
    #[must_use]
    pub const fn context(&self) -> &ExecutionContext {
        &self.context
    }

    /// Copy of this request for the given attempt (1-based)
    #[must_use]
    pub fn for_attempt(&self, attempt: u32) -> Self {
        Self {
            method: self.method.clone(),
            path: self.path.clone(),
            context: self.context.for_attempt(attempt),
        }
    }
}

/// Raw response of one attempt
///
/// A non-success status is not an error at this level. Classification and
/// mapping to `ApplicationError::UnexpectedStatus` happen further up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    status: StatusCode,
    body: Bytes,
}

impl TransportResponse {
    /// Create a response
    #[must_use]
    pub const fn new(status: StatusCode, body: Bytes) -> Self {
        Self { status, body }
    }

    /// Create a response with an empty body
    #[must_use]
    pub const fn empty(status: StatusCode) -> Self {
        Self::new(status, Bytes::new())
    }

    /// Status code
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Response body
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns true for a 2xx status
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Configuration for the HTTP transport
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Base URL of the downstream service
    pub base_url: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            base_url: "https://jsonplaceholder.typicode.com".to_string(),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("chaos-todos/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// `reqwest`-backed transport service
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Create a transport from configuration
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Configuration` if the client cannot be built.
    pub fn new(config: &HttpTransportConfig) -> Result<Self, ApplicationError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ApplicationError::Configuration(format!("HTTP client: {e}")))?;

        Ok(Self::with_client(client, config.base_url.clone()))
    }

    /// Create a transport around an existing client
    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Base URL requests are resolved against
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        if path.is_empty() {
            self.base_url.clone()
        } else if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    #[instrument(skip(client, context), fields(operation = context.operation(), attempt = context.attempt()))]
    async fn send(
        client: Client,
        method: Method,
        url: String,
        context: ExecutionContext,
    ) -> Outcome {
        let request = client
            .request(method, &url)
            .header(X_REQUEST_ID, context.correlation_id().to_string());

        let exchange = async {
            let response = request.send().await.map_err(map_reqwest_error)?;
            let status = response.status();
            let body = response.bytes().await.map_err(map_reqwest_error)?;
            Ok::<_, ApplicationError>(TransportResponse::new(status, body))
        };

        let response = tokio::select! {
            biased;
            () = context.cancellation().cancelled() => return Err(ApplicationError::Cancelled),
            response = exchange => response?,
        };

        debug!(
            status = response.status().as_u16(),
            bytes = response.body().len(),
            "Downstream responded"
        );
        Ok(response)
    }
}

fn map_reqwest_error(e: reqwest::Error) -> ApplicationError {
    if e.is_decode() {
        ApplicationError::Decode(e.to_string())
    } else {
        ApplicationError::Transport(e.to_string())
    }
}

impl Service<OutboundRequest> for HttpTransport {
    type Response = TransportResponse;
    type Error = ApplicationError;
    type Future = BoxFuture<'static, Outcome>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: OutboundRequest) -> Self::Future {
        let url = self.url_for(request.path());
        let OutboundRequest {
            method, context, ..
        } = request;
        Box::pin(Self::send(self.client.clone(), method, url, context))
    }
}
