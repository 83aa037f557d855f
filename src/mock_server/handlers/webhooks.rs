//! Webhook and webhook dispatch endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::{json, Map, Value};
use tokio::sync::RwLock;

use super::{data, error, list_page, not_found, ListParams};
use crate::mock_server::state::MockState;
use crate::{Webhook, WebhookDispatch};

fn invalid(message: impl Into<String>) -> Response {
    error(StatusCode::BAD_REQUEST, "invalid-parameters", message)
}

/// GET /v2/webhooks
pub async fn list_webhooks(
    State(state): State<Arc<RwLock<MockState>>>,
    Query(params): Query<ListParams>,
) -> Response {
    let state = state.read().await;
    list_page(state.list_webhooks(), &params)
}

/// POST /v2/webhooks
pub async fn create_webhook(
    State(state): State<Arc<RwLock<MockState>>>,
    Json(body): Json<Map<String, Value>>,
) -> Response {
    if !body.contains_key("requestUrl") || !body.contains_key("eventTypes") {
        return invalid("Webhook requires requestUrl and eventTypes");
    }

    let mut state = state.write().await;
    let mut fields = body;
    let now = json!(Utc::now());
    fields.insert("id".to_string(), json!(state.generate_id()));
    fields.insert("userId".to_string(), json!("mockUser"));
    fields.insert("createdAt".to_string(), now.clone());
    fields.insert("modifiedAt".to_string(), now);

    match serde_json::from_value::<Webhook>(Value::Object(fields)) {
        Ok(webhook) => {
            state.webhooks.insert(webhook.id.clone(), webhook.clone());
            data(StatusCode::CREATED, webhook)
        }
        Err(e) => invalid(e.to_string()),
    }
}

/// GET /v2/webhooks/{id}
pub async fn get_webhook(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
) -> Response {
    let state = state.read().await;
    match state.webhooks.get(&id) {
        Some(webhook) => data(StatusCode::OK, webhook),
        None => not_found(format!("Webhook was not found: {id}")),
    }
}

/// PUT /v2/webhooks/{id}
pub async fn update_webhook(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
    Json(body): Json<Map<String, Value>>,
) -> Response {
    let mut state = state.write().await;
    let Some(existing) = state.webhooks.get(&id) else {
        return not_found(format!("Webhook was not found: {id}"));
    };

    let Ok(Value::Object(mut fields)) = serde_json::to_value(existing) else {
        return error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal-error",
            "Stored webhook is not an object",
        );
    };
    fields.extend(body);
    fields.insert("id".to_string(), json!(id));
    fields.insert("modifiedAt".to_string(), json!(Utc::now()));

    match serde_json::from_value::<Webhook>(Value::Object(fields)) {
        Ok(webhook) => {
            state.webhooks.insert(id, webhook.clone());
            data(StatusCode::OK, webhook)
        }
        Err(e) => invalid(e.to_string()),
    }
}

/// DELETE /v2/webhooks/{id}
pub async fn delete_webhook(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
) -> Response {
    let mut state = state.write().await;
    match state.webhooks.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => not_found(format!("Webhook was not found: {id}")),
    }
}

/// POST /v2/webhooks/{id}/test
pub async fn test_webhook(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
) -> Response {
    let mut state = state.write().await;
    let Some(event_type) = state
        .webhooks
        .get(&id)
        .map(|webhook| webhook.event_types.first().copied())
    else {
        return not_found(format!("Webhook was not found: {id}"));
    };

    let dispatch = WebhookDispatch {
        id: state.generate_id(),
        user_id: Some("mockUser".to_string()),
        webhook_id: Some(id),
        created_at: Some(Utc::now()),
        status: Some("ACTIVE".to_string()),
        event_type,
        event_data: Some(json!({"test": true})),
        calls: Vec::new(),
        extra: Map::new(),
    };
    state.dispatches.insert(dispatch.id.clone(), dispatch.clone());
    data(StatusCode::CREATED, dispatch)
}

/// GET /v2/webhooks/{id}/dispatches
pub async fn list_webhook_dispatches(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
    Query(params): Query<ListParams>,
) -> Response {
    let state = state.read().await;
    if !state.webhooks.contains_key(&id) {
        return not_found(format!("Webhook was not found: {id}"));
    }
    list_page(state.list_dispatches(Some(&id)), &params)
}

/// GET /v2/webhook-dispatches
pub async fn list_dispatches(
    State(state): State<Arc<RwLock<MockState>>>,
    Query(params): Query<ListParams>,
) -> Response {
    let state = state.read().await;
    list_page(state.list_dispatches(None), &params)
}

/// GET /v2/webhook-dispatches/{id}
pub async fn get_dispatch(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
) -> Response {
    let state = state.read().await;
    match state.dispatches.get(&id) {
        Some(dispatch) => data(StatusCode::OK, dispatch),
        None => not_found(format!("Webhook dispatch was not found: {id}")),
    }
}
