//! Application layer - Use cases and orchestration
//!
//! Contains the error taxonomy shared by every layer of the outbound pipeline,
//! the per-request and per-call contexts, and the port definitions that the
//! infrastructure layer implements.

pub mod error;
pub mod execution_context;
pub mod ports;
pub mod request_context;
pub mod services;

pub use error::{ApplicationError, is_transient_status};
pub use execution_context::ExecutionContext;
pub use ports::*;
pub use request_context::RequestContext;
pub use services::*;
