//! Room shape listing — the REST read path clients load a canvas from.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::state::AppState;

/// Default and ceiling for the number of shapes returned.
const DEFAULT_LIMIT: i64 = 1000;
const MAX_LIMIT: i64 = 10_000;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    limit: Option<i64>,
}

/// `GET /api/rooms/{room_id}/shapes` — shapes in creation order.
///
/// Requires the same bearer credential the websocket admits with.
pub async fn list_shapes(
    State(state): State<AppState>,
    Path(room_id): Path<i64>,
    Query(params): Query<ListParams>,
    headers: HeaderMap,
) -> Response {
    let Some(_user_id) = bearer_token(&headers).and_then(|t| state.verifier.verify(t)) else {
        return (StatusCode::UNAUTHORIZED, "invalid token").into_response();
    };

    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    match state.gateway.list(room_id, limit).await {
        Ok(records) => {
            let shapes: Vec<_> = records.into_iter().map(|r| r.into_shape()).collect();
            Json(json!({ "shapes": shapes })).into_response()
        }
        Err(e) => {
            error!(%room_id, error = %e, "shape list failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to load shapes").into_response()
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
