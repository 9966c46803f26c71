//! Persistence seam for analysis runs and their comments.

use async_trait::async_trait;
use judiguard_core::status::{AnalysisStatus, Classification};
use judiguard_core::types::{DbId, Timestamp};
use judiguard_db::models::analyzed_comment::{
    AnalyzedComment, CommentDeletionOutcome, CreateAnalyzedComment,
};
use judiguard_db::models::video_analysis::{AnalysisStats, VideoAnalysis};
use judiguard_db::repositories::{AnalyzedCommentRepo, VideoAnalysisRepo};
use judiguard_db::DbPool;

/// Storage operations the pipeline needs. Every read is scoped by owner.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    async fn create_analysis(
        &self,
        user_id: DbId,
        youtube_video_id: &str,
    ) -> Result<VideoAnalysis, sqlx::Error>;

    async fn find_analysis(
        &self,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<VideoAnalysis>, sqlx::Error>;

    async fn list_analyses(&self, user_id: DbId) -> Result<Vec<VideoAnalysis>, sqlx::Error>;

    async fn set_title(&self, id: DbId, title: &str) -> Result<(), sqlx::Error>;

    async fn set_fetched_count(&self, id: DbId, fetched: i32) -> Result<(), sqlx::Error>;

    async fn mark_completed(&self, id: DbId, analyzed: i32) -> Result<(), sqlx::Error>;

    async fn mark_failed(&self, id: DbId, error_message: &str) -> Result<(), sqlx::Error>;

    async fn set_status(&self, id: DbId, status: AnalysisStatus) -> Result<(), sqlx::Error>;

    /// Move the analysis into `DELETING_CLASSIFIED_COMMENTS`, but only from a
    /// status that allows it. `false` means another request got there first
    /// or the analysis cannot be batch-deleted.
    async fn begin_batch_deletion(
        &self,
        id: DbId,
        attempted_at: Timestamp,
    ) -> Result<bool, sqlx::Error>;

    async fn finish_batch_deletion(
        &self,
        id: DbId,
        status: AnalysisStatus,
        success_count: i32,
        failure_count: i32,
    ) -> Result<(), sqlx::Error>;

    /// Subset of `youtube_comment_ids` already persisted by any analysis.
    async fn existing_comment_ids(
        &self,
        youtube_comment_ids: &[String],
    ) -> Result<Vec<String>, sqlx::Error>;

    /// Insert unless the YouTube comment id already exists.
    async fn insert_comment(
        &self,
        input: &CreateAnalyzedComment,
    ) -> Result<Option<AnalyzedComment>, sqlx::Error>;

    async fn list_comments(
        &self,
        analysis_id: DbId,
        user_id: DbId,
    ) -> Result<Vec<AnalyzedComment>, sqlx::Error>;

    async fn list_undeleted_comments(
        &self,
        analysis_id: DbId,
        user_id: DbId,
        classification: Classification,
    ) -> Result<Vec<AnalyzedComment>, sqlx::Error>;

    async fn find_comment(
        &self,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<AnalyzedComment>, sqlx::Error>;

    async fn record_deletion_outcome(
        &self,
        id: DbId,
        outcome: &CommentDeletionOutcome,
    ) -> Result<Option<AnalyzedComment>, sqlx::Error>;

    async fn analysis_stats(&self, analysis_id: DbId) -> Result<AnalysisStats, sqlx::Error>;
}

/// [`AnalysisStore`] backed by the Postgres repositories.
#[derive(Clone)]
pub struct PgAnalysisStore {
    pool: DbPool,
}

impl PgAnalysisStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalysisStore for PgAnalysisStore {
    async fn create_analysis(
        &self,
        user_id: DbId,
        youtube_video_id: &str,
    ) -> Result<VideoAnalysis, sqlx::Error> {
        VideoAnalysisRepo::create(&self.pool, user_id, youtube_video_id).await
    }

    async fn find_analysis(
        &self,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<VideoAnalysis>, sqlx::Error> {
        VideoAnalysisRepo::find_for_user(&self.pool, id, user_id).await
    }

    async fn list_analyses(&self, user_id: DbId) -> Result<Vec<VideoAnalysis>, sqlx::Error> {
        VideoAnalysisRepo::list_for_user(&self.pool, user_id).await
    }

    async fn set_title(&self, id: DbId, title: &str) -> Result<(), sqlx::Error> {
        VideoAnalysisRepo::set_title(&self.pool, id, title).await
    }

    async fn set_fetched_count(&self, id: DbId, fetched: i32) -> Result<(), sqlx::Error> {
        VideoAnalysisRepo::set_fetched_count(&self.pool, id, fetched).await
    }

    async fn mark_completed(&self, id: DbId, analyzed: i32) -> Result<(), sqlx::Error> {
        VideoAnalysisRepo::mark_completed(&self.pool, id, analyzed).await
    }

    async fn mark_failed(&self, id: DbId, error_message: &str) -> Result<(), sqlx::Error> {
        VideoAnalysisRepo::mark_failed(&self.pool, id, error_message).await
    }

    async fn set_status(&self, id: DbId, status: AnalysisStatus) -> Result<(), sqlx::Error> {
        VideoAnalysisRepo::set_status(&self.pool, id, status).await
    }

    async fn begin_batch_deletion(
        &self,
        id: DbId,
        attempted_at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        VideoAnalysisRepo::begin_batch_deletion(&self.pool, id, attempted_at).await
    }

    async fn finish_batch_deletion(
        &self,
        id: DbId,
        status: AnalysisStatus,
        success_count: i32,
        failure_count: i32,
    ) -> Result<(), sqlx::Error> {
        VideoAnalysisRepo::finish_batch_deletion(&self.pool, id, status, success_count, failure_count)
            .await
    }

    async fn existing_comment_ids(
        &self,
        youtube_comment_ids: &[String],
    ) -> Result<Vec<String>, sqlx::Error> {
        AnalyzedCommentRepo::existing_comment_ids(&self.pool, youtube_comment_ids).await
    }

    async fn insert_comment(
        &self,
        input: &CreateAnalyzedComment,
    ) -> Result<Option<AnalyzedComment>, sqlx::Error> {
        AnalyzedCommentRepo::insert_if_absent(&self.pool, input).await
    }

    async fn list_comments(
        &self,
        analysis_id: DbId,
        user_id: DbId,
    ) -> Result<Vec<AnalyzedComment>, sqlx::Error> {
        AnalyzedCommentRepo::list_for_analysis(&self.pool, analysis_id, user_id).await
    }

    async fn list_undeleted_comments(
        &self,
        analysis_id: DbId,
        user_id: DbId,
        classification: Classification,
    ) -> Result<Vec<AnalyzedComment>, sqlx::Error> {
        AnalyzedCommentRepo::list_undeleted_by_classification(
            &self.pool,
            analysis_id,
            user_id,
            classification,
        )
        .await
    }

    async fn find_comment(
        &self,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<AnalyzedComment>, sqlx::Error> {
        AnalyzedCommentRepo::find_for_user(&self.pool, id, user_id).await
    }

    async fn record_deletion_outcome(
        &self,
        id: DbId,
        outcome: &CommentDeletionOutcome,
    ) -> Result<Option<AnalyzedComment>, sqlx::Error> {
        AnalyzedCommentRepo::record_deletion_outcome(&self.pool, id, outcome).await
    }

    async fn analysis_stats(&self, analysis_id: DbId) -> Result<AnalysisStats, sqlx::Error> {
        AnalyzedCommentRepo::stats_for_analysis(&self.pool, analysis_id).await
    }
}
