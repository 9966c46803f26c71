//! YouTube Studio deep links for analysed videos.

use axum::extract::{Path, State};
use axum::Json;
use judiguard_core::error::CoreError;
use judiguard_core::types::DbId;
use judiguard_core::video_url::studio_comments_url;
use judiguard_db::repositories::UserRepo;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StudioLinkResponse {
    pub youtube_video_id: String,
    pub studio_url: String,
}

/// GET /api/v1/studio/comments-link/{analysis_id}
///
/// `authuser` selects the signed-in Google account matching the user's email.
pub async fn comments_link(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(analysis_id): Path<DbId>,
) -> AppResult<Json<DataResponse<StudioLinkResponse>>> {
    let analysis = state
        .analysis
        .get_analysis(analysis_id, auth.user_id)
        .await?;
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("user", auth.user_id))?;

    Ok(Json(DataResponse::new(StudioLinkResponse {
        studio_url: studio_comments_url(&analysis.youtube_video_id, &user.email),
        youtube_video_id: analysis.youtube_video_id,
    })))
}
