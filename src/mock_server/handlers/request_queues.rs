//! Request queue endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;

use super::{data, flag, list_page, not_found, ListParams, NameParams, RenameBody};
use crate::mock_server::state::{AddOutcome, MockState};
use crate::Request;

/// Query parameters of the queue endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueParams {
    pub limit: Option<usize>,
    pub forefront: Option<String>,
    pub client_key: Option<String>,
}

fn operation_info(outcome: AddOutcome) -> serde_json::Value {
    json!({
        "requestId": outcome.request_id,
        "wasAlreadyPresent": outcome.was_already_present,
        "wasAlreadyHandled": outcome.was_already_handled,
    })
}

/// GET /v2/request-queues
pub async fn list_request_queues(
    State(state): State<Arc<RwLock<MockState>>>,
    Query(params): Query<ListParams>,
) -> Response {
    let state = state.read().await;
    list_page(
        state.list_request_queues(flag(params.unnamed.as_deref())),
        &params,
    )
}

/// POST /v2/request-queues
pub async fn get_or_create_request_queue(
    State(state): State<Arc<RwLock<MockState>>>,
    Query(params): Query<NameParams>,
) -> Response {
    let mut state = state.write().await;
    let queue = state.get_or_create_request_queue(params.name.as_deref());
    data(StatusCode::CREATED, queue)
}

/// GET /v2/request-queues/{id}
pub async fn get_request_queue(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
) -> Response {
    let state = state.read().await;
    match state.request_queue(&id) {
        Some(queue) => data(StatusCode::OK, &queue.info),
        None => not_found(format!("Request queue was not found: {id}")),
    }
}

/// PUT /v2/request-queues/{id}
pub async fn update_request_queue(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
    Json(body): Json<RenameBody>,
) -> Response {
    let mut state = state.write().await;
    match state.update_request_queue(&id, body.name) {
        Some(queue) => data(StatusCode::OK, queue),
        None => not_found(format!("Request queue was not found: {id}")),
    }
}

/// DELETE /v2/request-queues/{id}
pub async fn delete_request_queue(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
) -> Response {
    let mut state = state.write().await;
    if state.delete_request_queue(&id) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found(format!("Request queue was not found: {id}"))
    }
}

/// GET /v2/request-queues/{id}/head
pub async fn list_head(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
    Query(params): Query<QueueParams>,
) -> Response {
    let state = state.read().await;
    let Some(queue) = state.request_queue(&id) else {
        return not_found(format!("Request queue was not found: {id}"));
    };
    let limit = params.limit.unwrap_or(100);
    let items: Vec<&Request> = queue
        .requests
        .iter()
        .filter(|r| r.handled_at.is_none())
        .take(limit)
        .collect();

    data(
        StatusCode::OK,
        json!({
            "limit": limit,
            "queueModifiedAt": queue.info.modified_at,
            "hadMultipleClients": queue.info.had_multiple_clients.unwrap_or(false),
            "items": items,
        }),
    )
}

/// POST /v2/request-queues/{id}/requests
pub async fn add_request(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
    Query(params): Query<QueueParams>,
    Json(request): Json<Request>,
) -> Response {
    let mut state = state.write().await;
    match state.add_request(
        &id,
        request,
        flag(params.forefront.as_deref()),
        params.client_key.as_deref(),
    ) {
        Some(outcome) => data(StatusCode::CREATED, operation_info(outcome)),
        None => not_found(format!("Request queue was not found: {id}")),
    }
}

/// GET /v2/request-queues/{id}/requests/{request_id}
pub async fn get_request(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((id, request_id)): Path<(String, String)>,
) -> Response {
    let state = state.read().await;
    let Some(queue) = state.request_queue(&id) else {
        return not_found(format!("Request queue was not found: {id}"));
    };
    match queue
        .requests
        .iter()
        .find(|r| r.id.as_deref() == Some(request_id.as_str()))
    {
        Some(request) => data(StatusCode::OK, request),
        None => not_found(format!("Request was not found: {request_id}")),
    }
}

/// PUT /v2/request-queues/{id}/requests/{request_id}
pub async fn update_request(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((id, request_id)): Path<(String, String)>,
    Query(params): Query<QueueParams>,
    Json(request): Json<Request>,
) -> Response {
    let mut state = state.write().await;
    match state.update_request(
        &id,
        &request_id,
        request,
        flag(params.forefront.as_deref()),
        params.client_key.as_deref(),
    ) {
        Some(outcome) => data(StatusCode::OK, operation_info(outcome)),
        None => not_found(format!("Request was not found: {request_id}")),
    }
}

/// DELETE /v2/request-queues/{id}/requests/{request_id}
pub async fn delete_request(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((id, request_id)): Path<(String, String)>,
) -> Response {
    let mut state = state.write().await;
    if state.delete_request(&id, &request_id) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found(format!("Request was not found: {request_id}"))
    }
}
