pub mod health;
pub mod ticker;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /validate-ticker                                 POST ticker lookup
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(ticker::router())
}

/// WebSocket endpoints, mounted at root level.
///
/// ```text
/// /ws/report                                       analysis session
/// ```
pub fn ws_routes() -> Router<AppState> {
    Router::new().route("/ws/report", get(ws::ws_handler))
}
