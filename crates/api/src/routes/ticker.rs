//! Route definitions for ticker validation.

use axum::routing::post;
use axum::Router;

use crate::handlers::ticker;
use crate::state::AppState;

/// Routes mounted under `/api`.
///
/// ```text
/// POST   /validate-ticker   -> validate_ticker
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/validate-ticker", post(ticker::validate_ticker))
}
