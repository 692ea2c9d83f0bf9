//! Chaos todos HTTP presentation layer
//!
//! Exposes the todos use case and the state of its outbound pipeline over
//! HTTP.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use middleware::{RequestId, RequestIdLayer};
pub use routes::{cors_layer, create_router};
pub use state::AppState;
