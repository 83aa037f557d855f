//! Key-value store endpoint handlers.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;

use super::{data, flag, list_page, not_found, ListParams, NameParams, RenameBody};
use crate::mock_server::state::{MockRecord, MockState};

/// Query parameters for listing keys.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeysQuery {
    pub limit: Option<usize>,
    pub exclusive_start_key: Option<String>,
}

/// GET /v2/key-value-stores
pub async fn list_key_value_stores(
    State(state): State<Arc<RwLock<MockState>>>,
    Query(params): Query<ListParams>,
) -> Response {
    let state = state.read().await;
    list_page(
        state.list_key_value_stores(flag(params.unnamed.as_deref())),
        &params,
    )
}

/// POST /v2/key-value-stores
pub async fn get_or_create_key_value_store(
    State(state): State<Arc<RwLock<MockState>>>,
    Query(params): Query<NameParams>,
) -> Response {
    let mut state = state.write().await;
    let store = state.get_or_create_key_value_store(params.name.as_deref());
    data(StatusCode::CREATED, store)
}

/// GET /v2/key-value-stores/{id}
pub async fn get_key_value_store(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
) -> Response {
    let state = state.read().await;
    match state.key_value_store(&id) {
        Some(store) => data(StatusCode::OK, &store.info),
        None => not_found(format!("Key-value store was not found: {id}")),
    }
}

/// PUT /v2/key-value-stores/{id}
pub async fn update_key_value_store(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
    Json(body): Json<RenameBody>,
) -> Response {
    let mut state = state.write().await;
    match state.update_key_value_store(&id, body.name) {
        Some(store) => data(StatusCode::OK, store),
        None => not_found(format!("Key-value store was not found: {id}")),
    }
}

/// DELETE /v2/key-value-stores/{id}
pub async fn delete_key_value_store(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
) -> Response {
    let mut state = state.write().await;
    if state.delete_key_value_store(&id) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found(format!("Key-value store was not found: {id}"))
    }
}

/// GET /v2/key-value-stores/{id}/keys
pub async fn list_keys(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
    Query(query): Query<KeysQuery>,
) -> Response {
    let state = state.read().await;
    let Some(store) = state.key_value_store(&id) else {
        return not_found(format!("Key-value store was not found: {id}"));
    };

    let limit = query.limit.unwrap_or(1000);
    let mut keys = store
        .records
        .iter()
        .filter(|(key, _)| {
            query
                .exclusive_start_key
                .as_deref()
                .map_or(true, |start| key.as_str() > start)
        })
        .map(|(key, record)| json!({"key": key, "size": record.value.len()}));

    let items: Vec<_> = keys.by_ref().take(limit).collect();
    let is_truncated = keys.next().is_some();
    let next_key = if is_truncated {
        items.last().and_then(|item| item["key"].as_str().map(str::to_string))
    } else {
        None
    };

    data(
        StatusCode::OK,
        json!({
            "items": items,
            "count": items.len(),
            "limit": limit,
            "exclusiveStartKey": query.exclusive_start_key,
            "isTruncated": is_truncated,
            "nextExclusiveStartKey": next_key,
        }),
    )
}

/// GET /v2/key-value-stores/{id}/records/{key}
pub async fn get_record(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((id, key)): Path<(String, String)>,
) -> Response {
    let state = state.read().await;
    let Some(store) = state.key_value_store(&id) else {
        return not_found(format!("Key-value store was not found: {id}"));
    };
    match store.records.get(&key) {
        Some(record) => (
            StatusCode::OK,
            [(CONTENT_TYPE, record.content_type.clone())],
            record.value.clone(),
        )
            .into_response(),
        None => not_found(format!("Record was not found: {key}")),
    }
}

/// PUT /v2/key-value-stores/{id}/records/{key}
pub async fn put_record(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((id, key)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let mut state = state.write().await;
    let Some(store) = state.key_value_store_mut(&id) else {
        return not_found(format!("Key-value store was not found: {id}"));
    };
    store.records.insert(
        key,
        MockRecord {
            value: body.to_vec(),
            content_type,
        },
    );
    (StatusCode::CREATED, Json(json!({}))).into_response()
}

/// DELETE /v2/key-value-stores/{id}/records/{key}
pub async fn delete_record(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((id, key)): Path<(String, String)>,
) -> Response {
    let mut state = state.write().await;
    let Some(store) = state.key_value_store_mut(&id) else {
        return not_found(format!("Key-value store was not found: {id}"));
    };
    match store.records.remove(&key) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => not_found(format!("Record was not found: {key}")),
    }
}
