//! Repository for the `video_analyses` table.
//!
//! Every read is scoped by `user_id`; a row owned by someone else is
//! indistinguishable from a missing row.

use judiguard_core::status::{AnalysisStatus, StatusId};
use judiguard_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::video_analysis::VideoAnalysis;

const COLUMNS: &str = "id, user_id, youtube_video_id, video_title, status_id, \
                        total_comments_fetched, total_comments_analyzed, error_message, \
                        last_batch_deletion_attempt_at, last_batch_deletion_success_count, \
                        last_batch_deletion_failure_count, requested_at, processing_started_at, \
                        completed_at, created_at, updated_at";

pub struct VideoAnalysisRepo;

impl VideoAnalysisRepo {
    /// Insert a new run in `PROCESSING` with zeroed counters.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        youtube_video_id: &str,
    ) -> Result<VideoAnalysis, sqlx::Error> {
        let query = format!(
            "INSERT INTO video_analyses
                (user_id, youtube_video_id, status_id, processing_started_at)
             VALUES ($1, $2, $3, NOW())
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VideoAnalysis>(&query)
            .bind(user_id)
            .bind(youtube_video_id)
            .bind(AnalysisStatus::Processing.id())
            .fetch_one(pool)
            .await
    }

    /// Find a run by id, scoped to its owner.
    pub async fn find_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<VideoAnalysis>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM video_analyses WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, VideoAnalysis>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's runs, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<VideoAnalysis>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM video_analyses WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, VideoAnalysis>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    pub async fn set_title(pool: &PgPool, id: DbId, title: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE video_analyses SET video_title = $2 WHERE id = $1")
            .bind(id)
            .bind(title)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn set_fetched_count(pool: &PgPool, id: DbId, fetched: i32) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE video_analyses SET total_comments_fetched = $2 WHERE id = $1")
            .bind(id)
            .bind(fetched)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Finish a run: record the analyzed count, set `COMPLETED`, stamp `completed_at`.
    pub async fn mark_completed(pool: &PgPool, id: DbId, analyzed: i32) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE video_analyses SET
                total_comments_analyzed = $2,
                status_id = $3,
                completed_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(analyzed)
        .bind(AnalysisStatus::Completed.id())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Stamp a run as `FAILED` with the error that stopped it.
    pub async fn mark_failed(pool: &PgPool, id: DbId, error_message: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE video_analyses SET
                status_id = $2,
                error_message = $3,
                completed_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(AnalysisStatus::Failed.id())
        .bind(error_message)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: AnalysisStatus,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE video_analyses SET status_id = $2 WHERE id = $1")
            .bind(id)
            .bind(status.id())
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Enter `DELETING_CLASSIFIED_COMMENTS` and stamp the attempt time.
    ///
    /// The transition only happens from a status that allows a batch
    /// deletion. Returns `false` when the row was not in such a status, which
    /// includes a deletion already running.
    pub async fn begin_batch_deletion(
        pool: &PgPool,
        id: DbId,
        attempted_at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let blocked: Vec<StatusId> = AnalysisStatus::BLOCKS_BATCH_DELETION
            .iter()
            .map(|s| s.id())
            .collect();
        let result = sqlx::query(
            "UPDATE video_analyses SET
                status_id = $2,
                last_batch_deletion_attempt_at = $3
             WHERE id = $1 AND NOT (status_id = ANY($4))",
        )
        .bind(id)
        .bind(AnalysisStatus::DeletingClassifiedComments.id())
        .bind(attempted_at)
        .bind(blocked)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record the terminal status and counts of a batch deletion.
    pub async fn finish_batch_deletion(
        pool: &PgPool,
        id: DbId,
        status: AnalysisStatus,
        success_count: i32,
        failure_count: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE video_analyses SET
                status_id = $2,
                last_batch_deletion_success_count = $3,
                last_batch_deletion_failure_count = $4
             WHERE id = $1",
        )
        .bind(id)
        .bind(status.id())
        .bind(success_count)
        .bind(failure_count)
        .execute(pool)
        .await?;
        Ok(())
    }
}
