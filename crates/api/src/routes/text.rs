use axum::routing::post;
use axum::Router;

use crate::handlers::text;
use crate::state::AppState;

/// Routes mounted at `/text`.
///
/// ```text
/// POST /predict   -> predict (public)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/predict", post(text::predict))
}
