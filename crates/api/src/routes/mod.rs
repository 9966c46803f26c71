pub mod analysis;
pub mod auth;
pub mod health;
pub mod studio;
pub mod text;
pub mod users;

use std::time::Duration;

use axum::http::StatusCode;
use axum::Router;
use tower_http::timeout::TimeoutLayer;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                               create local account (public)
/// /auth/verify-otp                             confirm email code (public)
/// /auth/resend-otp                             issue a new code (public)
/// /auth/login                                  email + password login (public)
/// /auth/google/signin                          Google ID token login (public)
/// /auth/forgot-password                        email a reset link (public)
/// /auth/reset-password/{token}                 consume reset link (public)
/// /auth/change-password                        change password (auth)
/// /auth/youtube/connect                        consent URL (auth)
/// /auth/youtube/callback                       OAuth redirect target (public)
/// /auth/youtube/disconnect                     unlink YouTube (auth)
///
/// /users/me                                    get, update, deactivate (auth)
///
/// /analysis/videos                             start, list (auth)
/// /analysis/videos/{analysis_id}               analysis + stats (auth)
/// /analysis/videos/{analysis_id}/comments      stored comments (auth)
/// /analysis/videos/{analysis_id}/judi-comments batch delete (auth)
/// /analysis/comments/{analyzed_comment_id}     single delete (auth)
///
/// /text/predict                                classify one text (public)
///
/// /studio/comments-link/{analysis_id}          YouTube Studio link (auth)
/// ```
///
/// `/analysis` gets `ANALYSIS_TIMEOUT_SECS`; everything else gets
/// `REQUEST_TIMEOUT_SECS`.
pub fn api_routes(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/text", text::router())
        .nest("/studio", studio::router())
        .layer(timeout(config.request_timeout_secs))
        // Added after `layer` so the shorter timeout does not apply here.
        .nest(
            "/analysis",
            analysis::router().layer(timeout(config.analysis_timeout_secs)),
        )
}

/// Answer `408 Request Timeout` once `secs` have passed.
pub fn timeout(secs: u64) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, Duration::from_secs(secs))
}
