//! Todos handler

use application::RequestContext;
use axum::{
    Json,
    extract::{Query, State},
};
use domain::TodoItem;
use tokio_util::sync::CancellationToken;

use crate::{error::ApiError, middleware::RequestId, state::AppState};

/// List todos from the downstream service
///
/// The inbound query string is forwarded as request context with repeated
/// keys preserved, so `?user=test` can switch chaos on in production. Dropping the handler
/// future (client disconnect) cancels the outbound call.
pub async fn list_todos(
    State(state): State<AppState>,
    request_id: RequestId,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<TodoItem>>, ApiError> {
    let request = RequestContext::with_request_id(request_id.as_uuid()).with_query(query);

    let cancellation = CancellationToken::new();
    let _guard = cancellation.clone().drop_guard();

    let todos = state.todo_service.list_todos(request, cancellation).await?;
    Ok(Json(todos))
}
