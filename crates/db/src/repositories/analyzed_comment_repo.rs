//! Repository for the `analyzed_comments` table.

use judiguard_core::status::Classification;
use judiguard_core::types::DbId;
use sqlx::PgPool;

use crate::models::analyzed_comment::{
    AnalyzedComment, CommentDeletionOutcome, CreateAnalyzedComment,
};
use crate::models::video_analysis::AnalysisStats;

const COLUMNS: &str = "id, video_analysis_id, user_id, youtube_video_id, youtube_comment_id, \
                        parent_youtube_comment_id, text_original, text_display, \
                        author_display_name, author_channel_id, author_profile_image_url, \
                        like_count, published_at, comment_updated_at, classification_id, \
                        confidence_score, model_version, is_deleted_on_youtube, \
                        deletion_attempted_at, deletion_error, moderation_status, \
                        created_at, updated_at";

pub struct AnalyzedCommentRepo;

impl AnalyzedCommentRepo {
    /// Insert a classified comment unless its YouTube id is already stored.
    ///
    /// Returns `None` when another ingestion persisted the same comment first.
    pub async fn insert_if_absent(
        pool: &PgPool,
        input: &CreateAnalyzedComment,
    ) -> Result<Option<AnalyzedComment>, sqlx::Error> {
        let query = format!(
            "INSERT INTO analyzed_comments
                (video_analysis_id, user_id, youtube_video_id, youtube_comment_id,
                 parent_youtube_comment_id, text_original, text_display,
                 author_display_name, author_channel_id, author_profile_image_url,
                 like_count, published_at, comment_updated_at, classification_id,
                 confidence_score, model_version)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
             ON CONFLICT (youtube_comment_id) DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AnalyzedComment>(&query)
            .bind(input.video_analysis_id)
            .bind(input.user_id)
            .bind(&input.youtube_video_id)
            .bind(&input.youtube_comment_id)
            .bind(&input.parent_youtube_comment_id)
            .bind(&input.text_original)
            .bind(&input.text_display)
            .bind(&input.author_display_name)
            .bind(&input.author_channel_id)
            .bind(&input.author_profile_image_url)
            .bind(input.like_count)
            .bind(input.published_at)
            .bind(input.comment_updated_at)
            .bind(input.classification.id())
            .bind(input.confidence_score)
            .bind(&input.model_version)
            .fetch_optional(pool)
            .await
    }

    /// Return the subset of `youtube_comment_ids` that is already stored.
    pub async fn existing_comment_ids(
        pool: &PgPool,
        youtube_comment_ids: &[String],
    ) -> Result<Vec<String>, sqlx::Error> {
        if youtube_comment_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_scalar::<_, String>(
            "SELECT youtube_comment_id FROM analyzed_comments WHERE youtube_comment_id = ANY($1)",
        )
        .bind(youtube_comment_ids)
        .fetch_all(pool)
        .await
    }

    /// All comments of one analysis, oldest publish time first.
    pub async fn list_for_analysis(
        pool: &PgPool,
        video_analysis_id: DbId,
        user_id: DbId,
    ) -> Result<Vec<AnalyzedComment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM analyzed_comments
             WHERE video_analysis_id = $1 AND user_id = $2
             ORDER BY published_at ASC NULLS LAST, id ASC"
        );
        sqlx::query_as::<_, AnalyzedComment>(&query)
            .bind(video_analysis_id)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Comments of one analysis with the given label not yet removed from YouTube.
    pub async fn list_undeleted_by_classification(
        pool: &PgPool,
        video_analysis_id: DbId,
        user_id: DbId,
        classification: Classification,
    ) -> Result<Vec<AnalyzedComment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM analyzed_comments
             WHERE video_analysis_id = $1 AND user_id = $2
               AND classification_id = $3 AND is_deleted_on_youtube = false
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, AnalyzedComment>(&query)
            .bind(video_analysis_id)
            .bind(user_id)
            .bind(classification.id())
            .fetch_all(pool)
            .await
    }

    /// Find one comment by id, scoped to its owner.
    pub async fn find_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<AnalyzedComment>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM analyzed_comments WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, AnalyzedComment>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Write a deletion/moderation outcome onto exactly one row.
    pub async fn record_deletion_outcome(
        pool: &PgPool,
        id: DbId,
        outcome: &CommentDeletionOutcome,
    ) -> Result<Option<AnalyzedComment>, sqlx::Error> {
        let query = format!(
            "UPDATE analyzed_comments SET
                is_deleted_on_youtube = $2,
                deletion_error = $3,
                moderation_status = COALESCE($4, moderation_status),
                deletion_attempted_at = $5
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AnalyzedComment>(&query)
            .bind(id)
            .bind(outcome.is_deleted_on_youtube)
            .bind(&outcome.deletion_error)
            .bind(&outcome.moderation_status)
            .bind(outcome.attempted_at)
            .fetch_optional(pool)
            .await
    }

    /// Per-classification counts for one analysis.
    pub async fn stats_for_analysis(
        pool: &PgPool,
        video_analysis_id: DbId,
    ) -> Result<AnalysisStats, sqlx::Error> {
        let row: (i64, i64, i64, i64, i64) = sqlx::query_as(
            "SELECT
                COUNT(*) FILTER (WHERE classification_id = $2),
                COUNT(*) FILTER (WHERE classification_id = $3),
                COUNT(*) FILTER (WHERE classification_id = $4),
                COUNT(*) FILTER (WHERE classification_id = $5),
                COUNT(*) FILTER (WHERE is_deleted_on_youtube)
             FROM analyzed_comments WHERE video_analysis_id = $1",
        )
        .bind(video_analysis_id)
        .bind(Classification::Judi.id())
        .bind(Classification::NonJudi.id())
        .bind(Classification::PendingAnalysis.id())
        .bind(Classification::ErrorAnalysis.id())
        .fetch_one(pool)
        .await?;

        Ok(AnalysisStats {
            judi: row.0,
            non_judi: row.1,
            pending_analysis: row.2,
            error_analysis: row.3,
            deleted_on_youtube: row.4,
        })
    }
}
