//! Video analysis run model and DTOs.

use judiguard_core::status::{AnalysisStatus, StatusId};
use judiguard_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `video_analyses` table.
#[derive(Debug, Clone, FromRow)]
pub struct VideoAnalysis {
    pub id: DbId,
    pub user_id: DbId,
    pub youtube_video_id: String,
    pub video_title: Option<String>,
    pub status_id: StatusId,
    pub total_comments_fetched: i32,
    pub total_comments_analyzed: i32,
    pub error_message: Option<String>,
    pub last_batch_deletion_attempt_at: Option<Timestamp>,
    pub last_batch_deletion_success_count: Option<i32>,
    pub last_batch_deletion_failure_count: Option<i32>,
    pub requested_at: Timestamp,
    pub processing_started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl VideoAnalysis {
    /// Decode `status_id`. Unknown ids are treated as `FAILED`.
    pub fn status(&self) -> AnalysisStatus {
        AnalysisStatus::from_id(self.status_id).unwrap_or(AnalysisStatus::Failed)
    }

    pub fn to_response(&self) -> VideoAnalysisResponse {
        VideoAnalysisResponse {
            id: self.id,
            youtube_video_id: self.youtube_video_id.clone(),
            video_title: self.video_title.clone(),
            status: self.status(),
            total_comments_fetched: self.total_comments_fetched,
            total_comments_analyzed: self.total_comments_analyzed,
            error_message: self.error_message.clone(),
            last_batch_deletion_attempt_at: self.last_batch_deletion_attempt_at,
            last_batch_deletion_success_count: self.last_batch_deletion_success_count,
            last_batch_deletion_failure_count: self.last_batch_deletion_failure_count,
            requested_at: self.requested_at,
            processing_started_at: self.processing_started_at,
            completed_at: self.completed_at,
        }
    }
}

/// API representation of an analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct VideoAnalysisResponse {
    pub id: DbId,
    pub youtube_video_id: String,
    pub video_title: Option<String>,
    pub status: AnalysisStatus,
    pub total_comments_fetched: i32,
    pub total_comments_analyzed: i32,
    pub error_message: Option<String>,
    pub last_batch_deletion_attempt_at: Option<Timestamp>,
    pub last_batch_deletion_success_count: Option<i32>,
    pub last_batch_deletion_failure_count: Option<i32>,
    pub requested_at: Timestamp,
    pub processing_started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

/// Per-classification comment counts for one analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisStats {
    pub judi: i64,
    pub non_judi: i64,
    pub pending_analysis: i64,
    pub error_analysis: i64,
    pub deleted_on_youtube: i64,
}

/// An analysis together with its aggregate statistics.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisWithStats {
    #[serde(flatten)]
    pub analysis: VideoAnalysisResponse,
    pub stats: AnalysisStats,
}
