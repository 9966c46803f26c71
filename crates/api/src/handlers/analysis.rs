//! Handlers for video analyses and deletion of flagged comments.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use judiguard_core::deletion::BatchDeletionSummary;
use judiguard_core::types::DbId;
use judiguard_db::models::analyzed_comment::AnalyzedCommentResponse;
use judiguard_db::models::video_analysis::{AnalysisWithStats, VideoAnalysisResponse};
use judiguard_pipeline::moderation::DeletionAction;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /analysis/videos`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartAnalysisRequest {
    pub video_url: String,
}

/// Query string for `DELETE /analysis/comments/{analyzed_comment_id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCommentParams {
    pub youtube_comment_id: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteCommentResponse {
    pub action: DeletionAction,
    pub comment: AnalyzedCommentResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/analysis/videos
///
/// Fetches, classifies, and stores the video's comments before responding.
pub async fn start_analysis(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<StartAnalysisRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<AnalysisWithStats>>)> {
    let analysis = state
        .analysis
        .start_analysis(auth.user_id, &input.video_url)
        .await?;
    let result = state
        .analysis
        .get_analysis_with_stats(analysis.id, auth.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(result))))
}

/// GET /api/v1/analysis/videos
pub async fn list_analyses(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<VideoAnalysisResponse>>>> {
    let analyses = state.analysis.list_analyses(auth.user_id).await?;
    Ok(Json(DataResponse::new(
        analyses.iter().map(|a| a.to_response()).collect(),
    )))
}

/// GET /api/v1/analysis/videos/{analysis_id}
pub async fn get_analysis(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(analysis_id): Path<DbId>,
) -> AppResult<Json<DataResponse<AnalysisWithStats>>> {
    let result = state
        .analysis
        .get_analysis_with_stats(analysis_id, auth.user_id)
        .await?;
    Ok(Json(DataResponse::new(result)))
}

/// GET /api/v1/analysis/videos/{analysis_id}/comments
pub async fn get_analysis_comments(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(analysis_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<AnalyzedCommentResponse>>>> {
    let comments = state
        .analysis
        .get_analysis_results(analysis_id, auth.user_id)
        .await?;
    Ok(Json(DataResponse::new(
        comments.iter().map(|c| c.to_response()).collect(),
    )))
}

/// DELETE /api/v1/analysis/videos/{analysis_id}/judi-comments
///
/// Per-comment failures are reported in the summary, not as an error status.
pub async fn delete_judi_comments(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(analysis_id): Path<DbId>,
) -> AppResult<Json<DataResponse<BatchDeletionSummary>>> {
    let summary = state
        .analysis
        .request_batch_delete(auth.user_id, analysis_id)
        .await?;
    Ok(Json(DataResponse::new(summary)))
}

/// DELETE /api/v1/analysis/comments/{analyzed_comment_id}?youtubeCommentId=...
pub async fn delete_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(analyzed_comment_id): Path<DbId>,
    Query(params): Query<DeleteCommentParams>,
) -> AppResult<Json<DataResponse<DeleteCommentResponse>>> {
    let outcome = state
        .analysis
        .request_delete_single_comment(auth.user_id, analyzed_comment_id, &params.youtube_comment_id)
        .await?;
    Ok(Json(DataResponse::new(DeleteCommentResponse {
        action: outcome.action,
        comment: outcome.comment.to_response(),
    })))
}
