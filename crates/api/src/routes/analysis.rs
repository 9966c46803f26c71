use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::analysis;
use crate::state::AppState;

/// Routes mounted at `/analysis`. All require authentication.
///
/// ```text
/// POST   /videos                                -> start_analysis
/// GET    /videos                                -> list_analyses
/// GET    /videos/{analysis_id}                  -> get_analysis
/// GET    /videos/{analysis_id}/comments         -> get_analysis_comments
/// DELETE /videos/{analysis_id}/judi-comments    -> delete_judi_comments
/// DELETE /comments/{analyzed_comment_id}        -> delete_comment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/videos",
            get(analysis::list_analyses).post(analysis::start_analysis),
        )
        .route("/videos/{analysis_id}", get(analysis::get_analysis))
        .route(
            "/videos/{analysis_id}/comments",
            get(analysis::get_analysis_comments),
        )
        .route(
            "/videos/{analysis_id}/judi-comments",
            delete(analysis::delete_judi_comments),
        )
        .route(
            "/comments/{analyzed_comment_id}",
            delete(analysis::delete_comment),
        )
}
