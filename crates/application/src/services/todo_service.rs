//! Todo service
//!
//! Entry use case: fetch todos for an inbound request.

use std::{fmt, sync::Arc};

use domain::TodoItem;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::{RequestContext, error::ApplicationError, ports::TodosPort};

/// Service that lists todos through the outbound client
#[derive(Clone)]
pub struct TodoService {
    todos: Arc<dyn TodosPort>,
}

impl fmt::Debug for TodoService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TodoService").finish_non_exhaustive()
    }
}

impl TodoService {
    /// Create a new todo service
    pub fn new(todos: Arc<dyn TodosPort>) -> Self {
        Self { todos }
    }

    /// List all todos for the given inbound request
    #[instrument(skip(self, request, cancellation), fields(request_id = %request.request_id()))]
    pub async fn list_todos(
        &self,
        request: RequestContext,
        cancellation: CancellationToken,
    ) -> Result<Vec<TodoItem>, ApplicationError> {
        match self.todos.fetch_todos(Some(request), cancellation).await {
            Ok(items) => {
                debug!(count = items.len(), "Fetched todos");
                Ok(items)
            },
            Err(e) => {
                warn!(error = %e, circuit_open = e.is_circuit_open(), "Fetching todos failed");
                Err(e)
            },
        }
    }
}
