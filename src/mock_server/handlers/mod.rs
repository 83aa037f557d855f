//! HTTP request handlers for the mock server.

pub mod datasets;
pub mod key_value_stores;
pub mod logs;
pub mod request_queues;
pub mod webhooks;

pub use datasets::*;
pub use key_value_stores::*;
pub use logs::*;
pub use request_queues::*;
pub use webhooks::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Offset paging parameters shared by the collection endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
    pub desc: Option<String>,
    pub unnamed: Option<String>,
}

/// Name parameter of get-or-create.
#[derive(Debug, Default, Deserialize)]
pub struct NameParams {
    pub name: Option<String>,
}

/// Rename body shared by the storage update endpoints.
#[derive(Debug, Deserialize)]
pub struct RenameBody {
    pub name: Option<String>,
}

/// Whether a query flag is set (`1` or `true`).
pub fn flag(value: Option<&str>) -> bool {
    matches!(value, Some("1") | Some("true"))
}

/// Wrap a value in the `{"data": ...}` envelope.
pub fn data<T: Serialize>(status: StatusCode, value: T) -> Response {
    (status, Json(json!({ "data": value }))).into_response()
}

/// Page a collection the way the API does.
pub fn list_page<T: Serialize>(mut items: Vec<T>, params: &ListParams) -> Response {
    let desc = flag(params.desc.as_deref());
    if desc {
        items.reverse();
    }
    let total = items.len() as u64;
    let offset = params.offset.unwrap_or(0);
    let limit = params.limit.unwrap_or(1000);
    let page: Vec<T> = items
        .into_iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(usize::try_from(limit).unwrap_or(usize::MAX))
        .collect();

    data(
        StatusCode::OK,
        json!({
            "total": total,
            "offset": offset,
            "limit": limit,
            "count": page.len(),
            "desc": desc,
            "items": page,
        }),
    )
}

/// The error envelope for a missing resource.
pub fn not_found(message: impl Into<String>) -> Response {
    error(StatusCode::NOT_FOUND, "record-not-found", message)
}

/// An error envelope with the given status and type.
pub fn error(status: StatusCode, error_type: &str, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "error": {
                "type": error_type,
                "message": message.into(),
            }
        })),
    )
        .into_response()
}
