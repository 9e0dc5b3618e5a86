use std::sync::Arc;

use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::StreamExt;

use crate::state::AppState;
use crate::ws::supervisor::ConnectionSupervisor;

/// HTTP handler that upgrades the connection to WebSocket.
///
/// After the upgrade the connection is handed to the
/// [`ConnectionSupervisor`], which runs one analysis job on it.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.supervisor))
}

/// Split the socket and supervise it until the job and listener are done.
async fn handle_socket(socket: WebSocket, supervisor: Arc<ConnectionSupervisor>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, "WebSocket connected");

    let (sink, stream) = socket.split();
    let outcome = supervisor
        .supervise(conn_id.clone(), Box::pin(sink), Box::pin(stream))
        .await;

    tracing::info!(conn_id = %conn_id, outcome = ?outcome, "WebSocket disconnected");
}
