//! Dataset endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{data, error, flag, list_page, not_found, ListParams, NameParams, RenameBody};
use crate::mock_server::state::{is_empty_item, MockState};

/// Query parameters for reading items.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemsQuery {
    pub format: Option<String>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
    pub desc: Option<String>,
    pub clean: Option<String>,
    pub skip_empty: Option<String>,
    pub skip_hidden: Option<String>,
    pub fields: Option<String>,
    pub omit: Option<String>,
}

fn split_list(value: Option<&str>) -> Vec<&str> {
    value
        .map(|v| v.split(',').filter(|s| !s.is_empty()).collect())
        .unwrap_or_default()
}

fn project_item(item: Value, query: &ItemsQuery) -> Value {
    let Value::Object(mut map) = item else {
        return item;
    };
    let fields = split_list(query.fields.as_deref());
    if !fields.is_empty() {
        map = fields
            .iter()
            .filter_map(|f| map.get(*f).map(|v| (f.to_string(), v.clone())))
            .collect();
    }
    for omitted in split_list(query.omit.as_deref()) {
        map.remove(omitted);
    }
    if flag(query.skip_hidden.as_deref()) || flag(query.clean.as_deref()) {
        map.retain(|key, _| !key.starts_with('#'));
    }
    Value::Object(map)
}

/// GET /v2/datasets
pub async fn list_datasets(
    State(state): State<Arc<RwLock<MockState>>>,
    Query(params): Query<ListParams>,
) -> Response {
    let state = state.read().await;
    list_page(state.list_datasets(flag(params.unnamed.as_deref())), &params)
}

/// POST /v2/datasets
pub async fn get_or_create_dataset(
    State(state): State<Arc<RwLock<MockState>>>,
    Query(params): Query<NameParams>,
) -> Response {
    let mut state = state.write().await;
    let dataset = state.get_or_create_dataset(params.name.as_deref());
    data(StatusCode::CREATED, dataset)
}

/// GET /v2/datasets/{id}
pub async fn get_dataset(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
) -> Response {
    let state = state.read().await;
    match state.dataset(&id) {
        Some(dataset) => data(StatusCode::OK, &dataset.info),
        None => not_found(format!("Dataset was not found: {id}")),
    }
}

/// PUT /v2/datasets/{id}
pub async fn update_dataset(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
    Json(body): Json<RenameBody>,
) -> Response {
    let mut state = state.write().await;
    match state.update_dataset(&id, body.name) {
        Some(dataset) => data(StatusCode::OK, dataset),
        None => not_found(format!("Dataset was not found: {id}")),
    }
}

/// DELETE /v2/datasets/{id}
pub async fn delete_dataset(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
) -> Response {
    let mut state = state.write().await;
    if state.delete_dataset(&id) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found(format!("Dataset was not found: {id}"))
    }
}

/// GET /v2/datasets/{id}/items
///
/// The window is cut first and filtered afterwards, so pages with empty
/// items hold fewer than `limit` entries.
pub async fn list_items(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
    Query(query): Query<ItemsQuery>,
) -> Response {
    let state = state.read().await;
    let Some(dataset) = state.dataset(&id) else {
        return not_found(format!("Dataset was not found: {id}"));
    };

    let mut items = dataset.items.clone();
    if flag(query.desc.as_deref()) {
        items.reverse();
    }
    let total = items.len() as u64;
    let offset = query.offset.unwrap_or(0);
    let limit = query.limit.unwrap_or(total.max(1));
    let skip_empty = flag(query.skip_empty.as_deref()) || flag(query.clean.as_deref());

    let page: Vec<Value> = items
        .into_iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(usize::try_from(limit).unwrap_or(usize::MAX))
        .filter(|item| !(skip_empty && is_empty_item(item)))
        .map(|item| project_item(item, &query))
        .collect();

    let headers = [
        ("x-apify-pagination-total", total.to_string()),
        ("x-apify-pagination-offset", offset.to_string()),
        ("x-apify-pagination-limit", limit.to_string()),
    ];

    match query.format.as_deref().unwrap_or("json") {
        "json" => (StatusCode::OK, headers, Json(page)).into_response(),
        "jsonl" => {
            let body: String = page
                .iter()
                .map(|item| format!("{item}\n"))
                .collect();
            (
                StatusCode::OK,
                headers,
                [("content-type", "application/jsonl; charset=utf-8".to_string())],
                body,
            )
                .into_response()
        }
        other => error(
            StatusCode::BAD_REQUEST,
            "invalid-parameters",
            format!("Format '{other}' is not supported by the mock server"),
        ),
    }
}

/// POST /v2/datasets/{id}/items
pub async fn push_items(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
    Json(items): Json<Value>,
) -> Response {
    if !matches!(items, Value::Object(_) | Value::Array(_)) {
        return error(
            StatusCode::BAD_REQUEST,
            "invalid-parameters",
            "Items must be an object or an array of objects",
        );
    }
    let mut state = state.write().await;
    if state.push_items(&id, items) {
        (StatusCode::CREATED, Json(serde_json::json!({}))).into_response()
    } else {
        not_found(format!("Dataset was not found: {id}"))
    }
}
