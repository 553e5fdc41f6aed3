//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the websocket relay endpoint and the REST shape-listing path under
//! a single Axum router. CORS is wide open; browser canvas clients connect
//! from arbitrary origins.

pub mod shapes;
pub mod ws;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

#[must_use]
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/ws", get(ws::handle_ws))
        .route("/api/rooms/{room_id}/shapes", get(shapes::list_shapes))
        .route("/healthz", get(healthz))
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
