//! Route table.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::ui::{
    handler::{get_messages, health_check, websocket_handler},
    state::AppState,
};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws/{tip_id}", get(websocket_handler))
        .route("/messages/{tip_id}", get(get_messages))
        .route("/api/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
