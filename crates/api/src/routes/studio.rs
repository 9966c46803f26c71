use axum::routing::get;
use axum::Router;

use crate::handlers::studio;
use crate::state::AppState;

/// Routes mounted at `/studio`.
///
/// ```text
/// GET /comments-link/{analysis_id}   -> comments_link (auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/comments-link/{analysis_id}", get(studio::comments_link))
}
