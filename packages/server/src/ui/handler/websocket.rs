//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Path, State,
        ws::{WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use futures_util::stream::StreamExt;

use crate::{
    domain::{TipId, UserId},
    ui::{
        handler::identity::{tip_id_from_path, user_id_from_headers},
        realtime::{Connection, serve},
        state::AppState,
    },
};

/// Upgrade to a WebSocket bound to one tip room.
///
/// Identity and room id are checked before the upgrade, so a rejected request
/// never creates a connection.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(tip_id): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, StatusCode> {
    let user_id = match user_id_from_headers(&headers) {
        Ok(id) => id,
        Err(status) => {
            tracing::warn!("Rejected upgrade to '{}': missing user identity", tip_id);
            return Err(status);
        }
    };
    let tip_id = tip_id_from_path(tip_id)?;

    tracing::debug!("Upgrading '{}' into room '{}'", user_id, tip_id);
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, user_id, tip_id)))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, user_id: UserId, tip_id: TipId) {
    let (sink, stream) = socket.split();
    let (conn, rx) = Connection::new(user_id, tip_id, state.hub.config().outbound_capacity);

    serve(
        state.hub.clone(),
        state.dispatcher.clone(),
        conn,
        rx,
        stream,
        sink,
    )
    .await;
}
