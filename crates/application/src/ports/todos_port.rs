//! Todos port
//!
//! Outbound access to the downstream todos API.

use async_trait::async_trait;
use domain::TodoItem;
#[cfg(test)]
use mockall::automock;
use tokio_util::sync::CancellationToken;

use crate::{RequestContext, error::ApplicationError};

/// Port for fetching todo items from the downstream service
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TodosPort: Send + Sync {
    /// Fetch all todo items
    ///
    /// An absent or `null` payload yields an empty list. Errors surfaced by
    /// the resilience pipeline are returned unchanged.
    async fn fetch_todos(
        &self,
        request: Option<RequestContext>,
        cancellation: CancellationToken,
    ) -> Result<Vec<TodoItem>, ApplicationError>;
}
