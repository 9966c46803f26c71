//! Analyzed comment model and DTOs.

use judiguard_core::status::{Classification, StatusId};
use judiguard_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `analyzed_comments` table.
#[derive(Debug, Clone, FromRow)]
pub struct AnalyzedComment {
    pub id: DbId,
    pub video_analysis_id: DbId,
    pub user_id: DbId,
    pub youtube_video_id: String,
    pub youtube_comment_id: String,
    pub parent_youtube_comment_id: Option<String>,
    pub text_original: String,
    pub text_display: String,
    pub author_display_name: Option<String>,
    pub author_channel_id: Option<String>,
    pub author_profile_image_url: Option<String>,
    pub like_count: i64,
    pub published_at: Option<Timestamp>,
    pub comment_updated_at: Option<Timestamp>,
    pub classification_id: StatusId,
    pub confidence_score: f64,
    pub model_version: Option<String>,
    pub is_deleted_on_youtube: bool,
    pub deletion_attempted_at: Option<Timestamp>,
    pub deletion_error: Option<String>,
    pub moderation_status: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AnalyzedComment {
    /// Decode `classification_id`. Unknown ids are treated as `ERROR_ANALYSIS`.
    pub fn classification(&self) -> Classification {
        Classification::from_id(self.classification_id).unwrap_or(Classification::ErrorAnalysis)
    }

    pub fn to_response(&self) -> AnalyzedCommentResponse {
        AnalyzedCommentResponse {
            id: self.id,
            video_analysis_id: self.video_analysis_id,
            youtube_video_id: self.youtube_video_id.clone(),
            youtube_comment_id: self.youtube_comment_id.clone(),
            parent_youtube_comment_id: self.parent_youtube_comment_id.clone(),
            text_original: self.text_original.clone(),
            text_display: self.text_display.clone(),
            author_display_name: self.author_display_name.clone(),
            author_channel_id: self.author_channel_id.clone(),
            author_profile_image_url: self.author_profile_image_url.clone(),
            like_count: self.like_count,
            published_at: self.published_at,
            comment_updated_at: self.comment_updated_at,
            classification: self.classification(),
            confidence_score: self.confidence_score,
            model_version: self.model_version.clone(),
            is_deleted_on_youtube: self.is_deleted_on_youtube,
            deletion_attempted_at: self.deletion_attempted_at,
            deletion_error: self.deletion_error.clone(),
            moderation_status: self.moderation_status.clone(),
        }
    }
}

/// API representation of an analyzed comment (no owning user id).
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzedCommentResponse {
    pub id: DbId,
    pub video_analysis_id: DbId,
    pub youtube_video_id: String,
    pub youtube_comment_id: String,
    pub parent_youtube_comment_id: Option<String>,
    pub text_original: String,
    pub text_display: String,
    pub author_display_name: Option<String>,
    pub author_channel_id: Option<String>,
    pub author_profile_image_url: Option<String>,
    pub like_count: i64,
    pub published_at: Option<Timestamp>,
    pub comment_updated_at: Option<Timestamp>,
    pub classification: Classification,
    pub confidence_score: f64,
    pub model_version: Option<String>,
    pub is_deleted_on_youtube: bool,
    pub deletion_attempted_at: Option<Timestamp>,
    pub deletion_error: Option<String>,
    pub moderation_status: Option<String>,
}

/// DTO for inserting a freshly classified comment.
#[derive(Debug, Clone)]
pub struct CreateAnalyzedComment {
    pub video_analysis_id: DbId,
    pub user_id: DbId,
    pub youtube_video_id: String,
    pub youtube_comment_id: String,
    pub parent_youtube_comment_id: Option<String>,
    pub text_original: String,
    pub text_display: String,
    pub author_display_name: Option<String>,
    pub author_channel_id: Option<String>,
    pub author_profile_image_url: Option<String>,
    pub like_count: i64,
    pub published_at: Option<Timestamp>,
    pub comment_updated_at: Option<Timestamp>,
    pub classification: Classification,
    pub confidence_score: f64,
    pub model_version: String,
}

/// Outcome of one deletion or moderation attempt, written back to the row.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentDeletionOutcome {
    pub is_deleted_on_youtube: bool,
    pub deletion_error: Option<String>,
    pub moderation_status: Option<String>,
    pub attempted_at: Timestamp,
}
