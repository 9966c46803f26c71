//! Removing flagged comments from YouTube.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use judiguard_core::comment_id::is_valid_comment_id;
use judiguard_core::deletion::{BatchDeletionSummary, DeletionFailure};
use judiguard_core::error::CoreError;
use judiguard_core::status::{AnalysisStatus, Classification};
use judiguard_core::types::DbId;
use judiguard_db::models::analyzed_comment::{AnalyzedComment, CommentDeletionOutcome};
use judiguard_youtube::service;
use judiguard_youtube::types::ModerationStatus;
use judiguard_youtube::{YouTubeApi, YouTubeError};
use serde::Serialize;

use crate::error::{PipelineError, PipelineResult};
use crate::ingest::{saturating_i32, AnalysisService};

/// What a single-comment deletion request ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionAction {
    /// The comment was already gone; nothing was sent to YouTube.
    AlreadyDeleted,
    Deleted,
    /// The channel could not delete the comment, so it was held for review.
    HeldForReview,
}

#[derive(Debug, Clone)]
pub struct SingleDeletion {
    pub action: DeletionAction,
    pub comment: AnalyzedComment,
}

impl AnalysisService {
    /// Delete every not-yet-deleted `JUDI` comment of an analysis.
    ///
    /// Each deletion is attempted independently and its outcome written to
    /// its own row. The analysis ends in a status reflecting the mix of
    /// outcomes. Comments the channel did not author are reported as failures.
    ///
    /// Only one batch runs per analysis at a time. Once started, the batch
    /// runs on its own task and always leaves `DELETING_CLASSIFIED_COMMENTS`,
    /// even if the caller stops waiting.
    pub async fn request_batch_delete(
        &self,
        user_id: DbId,
        analysis_id: DbId,
    ) -> PipelineResult<BatchDeletionSummary> {
        let analysis = self.get_analysis(analysis_id, user_id).await?;
        let status = analysis.status();
        if !status.allows_batch_deletion() {
            return Err(CoreError::Conflict(format!(
                "Batch deletion is not possible while the analysis is {status}"
            ))
            .into());
        }

        let api = self.connector.connect(user_id).await?;
        let targets = self
            .store
            .list_undeleted_comments(analysis.id, user_id, Classification::Judi)
            .await?;

        if targets.is_empty() {
            self.store
                .set_status(analysis.id, AnalysisStatus::Completed)
                .await?;
            tracing::info!(analysis_id, "No flagged comments left to delete");
            return Ok(BatchDeletionSummary::default());
        }

        if !self
            .store
            .begin_batch_deletion(analysis.id, Utc::now())
            .await?
        {
            return Err(CoreError::Conflict(
                "A batch deletion is already running for this analysis".into(),
            )
            .into());
        }
        tracing::info!(analysis_id, targets = targets.len(), "Batch deletion started");

        let run = {
            let service = self.clone();
            tokio::spawn(async move { service.delete_batch(api, analysis_id, targets).await })
        };
        match run.await {
            Ok(result) => result,
            Err(join_err) => {
                tracing::error!(analysis_id, error = %join_err, "Batch deletion task did not finish");
                self.release_batch(analysis_id, AnalysisStatus::CompletedDeletionWithPartialErrors)
                    .await;
                Err(CoreError::Internal(format!("Batch deletion did not finish: {join_err}")).into())
            }
        }
    }

    /// Fan out the deletions, record every outcome, and leave the analysis in
    /// a terminal status.
    async fn delete_batch(
        &self,
        api: Arc<dyn YouTubeApi>,
        analysis_id: DbId,
        targets: Vec<AnalyzedComment>,
    ) -> PipelineResult<BatchDeletionSummary> {
        let outcomes = join_all(
            targets
                .iter()
                .map(|c| service::delete_comment(api.as_ref(), &c.youtube_comment_id)),
        )
        .await;

        let mut summary = BatchDeletionSummary::default();
        for (comment, outcome) in targets.iter().zip(outcomes) {
            let record = match &outcome {
                Ok(()) => deleted_outcome(),
                Err(e) => failed_outcome(e),
            };
            if let Err(e) = self.store.record_deletion_outcome(comment.id, &record).await {
                tracing::error!(
                    analyzed_comment_id = comment.id,
                    error = %e,
                    "Failed to record deletion outcome"
                );
            }

            match outcome {
                Ok(()) => summary.record_success(),
                Err(e) => {
                    tracing::warn!(
                        analyzed_comment_id = comment.id,
                        youtube_comment_id = %comment.youtube_comment_id,
                        error = %e,
                        "Comment deletion failed"
                    );
                    summary.record_failure(DeletionFailure {
                        analyzed_comment_id: comment.id,
                        youtube_comment_id: comment.youtube_comment_id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let final_status = summary.final_status();
        if let Err(e) = self
            .store
            .finish_batch_deletion(
                analysis_id,
                final_status,
                saturating_i32(summary.successfully_deleted),
                saturating_i32(summary.failed_to_delete),
            )
            .await
        {
            tracing::error!(analysis_id, error = %e, "Failed to record batch deletion result");
            self.release_batch(analysis_id, final_status).await;
            return Err(e.into());
        }

        tracing::info!(
            analysis_id,
            deleted = summary.successfully_deleted,
            failed = summary.failed_to_delete,
            status = %final_status,
            "Batch deletion finished"
        );
        Ok(summary)
    }

    /// Best effort: move an analysis out of `DELETING_CLASSIFIED_COMMENTS`.
    async fn release_batch(&self, analysis_id: DbId, status: AnalysisStatus) {
        if let Err(e) = self.store.set_status(analysis_id, status).await {
            tracing::error!(
                analysis_id,
                error = %e,
                "Analysis left in DELETING_CLASSIFIED_COMMENTS"
            );
        }
    }

    /// Delete one stored comment from YouTube.
    ///
    /// When the channel did not author the comment, falls back to holding it
    /// for review, which needs the channel to own the video instead.
    pub async fn request_delete_single_comment(
        &self,
        user_id: DbId,
        analyzed_comment_id: DbId,
        youtube_comment_id: &str,
    ) -> PipelineResult<SingleDeletion> {
        if analyzed_comment_id <= 0 {
            return Err(CoreError::Validation("Invalid analyzed comment id".into()).into());
        }
        if !is_valid_comment_id(youtube_comment_id) {
            return Err(CoreError::Validation("Invalid YouTube comment id".into()).into());
        }

        let comment = self
            .store
            .find_comment(analyzed_comment_id, user_id)
            .await?
            .filter(|c| c.youtube_comment_id == youtube_comment_id)
            .ok_or_else(|| CoreError::not_found("analyzed comment", analyzed_comment_id))?;

        if comment.is_deleted_on_youtube {
            return Ok(SingleDeletion {
                action: DeletionAction::AlreadyDeleted,
                comment,
            });
        }

        let api = self.connector.connect(user_id).await?;
        match service::delete_comment(api.as_ref(), youtube_comment_id).await {
            Ok(()) => {
                let comment = self.record_outcome(comment.id, &deleted_outcome()).await?;
                Ok(SingleDeletion {
                    action: DeletionAction::Deleted,
                    comment,
                })
            }
            Err(not_owner @ YouTubeError::NotCommentOwner { .. }) => {
                tracing::info!(
                    analyzed_comment_id,
                    youtube_comment_id,
                    "Not the comment author, holding comment for review instead"
                );
                let status = ModerationStatus::HeldForReview;
                match service::moderate_comment(api.as_ref(), youtube_comment_id, status).await {
                    Ok(()) => {
                        let outcome = CommentDeletionOutcome {
                            is_deleted_on_youtube: false,
                            deletion_error: Some(not_owner.to_string()),
                            moderation_status: Some(status.as_str().to_string()),
                            attempted_at: Utc::now(),
                        };
                        let comment = self.record_outcome(comment.id, &outcome).await?;
                        Ok(SingleDeletion {
                            action: DeletionAction::HeldForReview,
                            comment,
                        })
                    }
                    Err(e) => Err(self.record_failure(comment.id, e).await),
                }
            }
            Err(e) => Err(self.record_failure(comment.id, e).await),
        }
    }

    async fn record_outcome(
        &self,
        analyzed_comment_id: DbId,
        outcome: &CommentDeletionOutcome,
    ) -> PipelineResult<AnalyzedComment> {
        self.store
            .record_deletion_outcome(analyzed_comment_id, outcome)
            .await?
            .ok_or_else(|| CoreError::not_found("analyzed comment", analyzed_comment_id).into())
    }

    /// Write a failed attempt onto the row, then hand back the original error.
    async fn record_failure(&self, analyzed_comment_id: DbId, err: YouTubeError) -> PipelineError {
        tracing::warn!(analyzed_comment_id, error = %err, "Comment deletion failed");
        if let Err(record_err) = self
            .store
            .record_deletion_outcome(analyzed_comment_id, &failed_outcome(&err))
            .await
        {
            tracing::error!(
                analyzed_comment_id,
                error = %record_err,
                "Failed to record deletion outcome"
            );
        }
        err.into()
    }
}

fn deleted_outcome() -> CommentDeletionOutcome {
    CommentDeletionOutcome {
        is_deleted_on_youtube: true,
        deletion_error: None,
        moderation_status: None,
        attempted_at: Utc::now(),
    }
}

fn failed_outcome(err: &YouTubeError) -> CommentDeletionOutcome {
    CommentDeletionOutcome {
        is_deleted_on_youtube: false,
        deletion_error: Some(err.to_string()),
        moderation_status: None,
        attempted_at: Utc::now(),
    }
}
