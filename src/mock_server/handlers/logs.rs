//! Log endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
};
use tokio::sync::RwLock;

use super::not_found;
use crate::mock_server::state::MockState;

/// GET /v2/logs/{id}
pub async fn get_log(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
) -> Response {
    let state = state.read().await;
    match state.logs.get(&id) {
        Some(text) => (
            StatusCode::OK,
            [(CONTENT_TYPE, "text/plain; charset=utf-8")],
            text.clone(),
        )
            .into_response(),
        None => not_found(format!("Log was not found: {id}")),
    }
}
