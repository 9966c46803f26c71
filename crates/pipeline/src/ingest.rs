//! Analysis runs: fetch a video's comments, drop the ones already stored,
//! classify the rest, and persist them.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use judiguard_classifier::CommentClassifier;
use judiguard_core::comment_id::is_top_level_comment_id;
use judiguard_core::error::CoreError;
use judiguard_core::types::DbId;
use judiguard_core::video_url::require_video_id;
use judiguard_db::models::analyzed_comment::{AnalyzedComment, CreateAnalyzedComment};
use judiguard_db::models::video_analysis::{AnalysisWithStats, VideoAnalysis};
use judiguard_youtube::service;
use judiguard_youtube::types::{FetchedComment, FetchedThread};
use judiguard_youtube::YouTubeApi;

use crate::config::PipelineConfig;
use crate::connector::YouTubeConnector;
use crate::error::{PipelineError, PipelineResult};
use crate::store::AnalysisStore;

/// Orchestrates analysis runs and comment deletion for all users.
///
/// Cloning is cheap; clones share the same store, connector and classifier.
#[derive(Clone)]
pub struct AnalysisService {
    pub(crate) store: Arc<dyn AnalysisStore>,
    pub(crate) connector: Arc<dyn YouTubeConnector>,
    pub(crate) classifier: Arc<dyn CommentClassifier>,
    pub(crate) config: PipelineConfig,
}

impl AnalysisService {
    pub fn new(
        store: Arc<dyn AnalysisStore>,
        connector: Arc<dyn YouTubeConnector>,
        classifier: Arc<dyn CommentClassifier>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            connector,
            classifier,
            config,
        }
    }

    // -----------------------------------------------------------------------
    // Analysis runs
    // -----------------------------------------------------------------------

    /// Run a complete analysis of the video at `video_url` for `user_id`.
    ///
    /// Returns the analysis row in its final state. Once the row exists the
    /// run continues on its own task, so it still ends `COMPLETED` or
    /// `FAILED` if the caller stops waiting. Any error is stamped onto the
    /// row as `FAILED` before being returned.
    pub async fn start_analysis(
        &self,
        user_id: DbId,
        video_url: &str,
    ) -> PipelineResult<VideoAnalysis> {
        let video_id = require_video_id(video_url)?;
        let api = self.connector.connect(user_id).await?;

        let analysis = self.store.create_analysis(user_id, &video_id).await?;
        tracing::info!(
            analysis_id = analysis.id,
            user_id,
            video_id = %video_id,
            "Analysis started"
        );

        let run = {
            let service = self.clone();
            let analysis = analysis.clone();
            tokio::spawn(async move { service.run_to_terminal_status(api, &analysis).await })
        };
        match run.await {
            Ok(result) => result?,
            Err(join_err) => {
                let err = PipelineError::from(CoreError::Internal(format!(
                    "Analysis task did not finish: {join_err}"
                )));
                self.stamp_failed(analysis.id, &err.to_string()).await;
                return Err(err);
            }
        }

        self.store
            .find_analysis(analysis.id, user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("video analysis", analysis.id).into())
    }

    async fn run_to_terminal_status(
        &self,
        api: Arc<dyn YouTubeApi>,
        analysis: &VideoAnalysis,
    ) -> PipelineResult<()> {
        match self.run_analysis(api.as_ref(), analysis).await {
            Ok(()) => Ok(()),
            Err(e) => {
                let message = e.to_string();
                tracing::error!(analysis_id = analysis.id, error = %message, "Analysis failed");
                self.stamp_failed(analysis.id, &message).await;
                Err(e)
            }
        }
    }

    async fn stamp_failed(&self, analysis_id: DbId, error_message: &str) {
        if let Err(stamp_err) = self.store.mark_failed(analysis_id, error_message).await {
            tracing::error!(
                analysis_id,
                error = %stamp_err,
                "Failed to mark analysis as failed"
            );
        }
    }

    async fn run_analysis(
        &self,
        api: &dyn YouTubeApi,
        analysis: &VideoAnalysis,
    ) -> PipelineResult<()> {
        let video_id = analysis.youtube_video_id.as_str();

        match service::get_video_details(api, video_id).await {
            Ok(details) => {
                if let Some(title) = details.title.as_deref() {
                    self.store.set_title(analysis.id, title).await?;
                }
            }
            Err(e) => {
                tracing::warn!(analysis_id = analysis.id, error = %e, "Could not fetch video title");
            }
        }

        let threads = service::fetch_comments(
            api,
            video_id,
            analysis.user_id,
            self.config.page_size,
            self.config.comment_limit,
        )
        .await?;
        self.store
            .set_fetched_count(analysis.id, saturating_i32(threads.len()))
            .await?;

        if threads.is_empty() {
            self.store.mark_completed(analysis.id, 0).await?;
            tracing::info!(analysis_id = analysis.id, "No comments found");
            return Ok(());
        }

        let candidates = unique_valid_comments(analysis.id, threads);
        let new_comments = self.drop_already_stored(candidates).await?;

        let classifications = join_all(
            new_comments
                .iter()
                .map(|c| self.classifier.classify(&c.text_original)),
        )
        .await;

        let inserts = new_comments
            .iter()
            .zip(classifications)
            .map(|(comment, result)| CreateAnalyzedComment {
                video_analysis_id: analysis.id,
                user_id: analysis.user_id,
                youtube_video_id: analysis.youtube_video_id.clone(),
                youtube_comment_id: comment.id.clone(),
                parent_youtube_comment_id: comment.parent_id.clone(),
                text_original: comment.text_original.clone(),
                text_display: comment.text_display.clone(),
                author_display_name: comment.author_display_name.clone(),
                author_channel_id: comment.author_channel_id.clone(),
                author_profile_image_url: comment.author_profile_image_url.clone(),
                like_count: comment.like_count,
                published_at: comment.published_at,
                comment_updated_at: comment.updated_at,
                classification: result.classification,
                confidence_score: result.confidence_score,
                model_version: result.model_version,
            })
            .collect::<Vec<_>>();

        let results = join_all(inserts.iter().map(|input| self.store.insert_comment(input))).await;

        let mut analyzed = 0usize;
        let mut failed = 0usize;
        for (input, result) in inserts.iter().zip(results) {
            match result {
                Ok(Some(_)) => analyzed += 1,
                Ok(None) => tracing::debug!(
                    youtube_comment_id = %input.youtube_comment_id,
                    "Comment persisted concurrently by another analysis"
                ),
                Err(e) => {
                    failed += 1;
                    tracing::error!(
                        analysis_id = analysis.id,
                        youtube_comment_id = %input.youtube_comment_id,
                        error = %e,
                        "Failed to persist analyzed comment"
                    );
                }
            }
        }

        self.store
            .mark_completed(analysis.id, saturating_i32(analyzed))
            .await?;
        tracing::info!(
            analysis_id = analysis.id,
            analyzed,
            failed,
            "Analysis completed"
        );
        Ok(())
    }

    /// Remove comments whose YouTube id is already stored by any analysis.
    async fn drop_already_stored(
        &self,
        candidates: Vec<FetchedComment>,
    ) -> PipelineResult<Vec<FetchedComment>> {
        let ids: Vec<String> = candidates.iter().map(|c| c.id.clone()).collect();
        let existing: HashSet<String> = self
            .store
            .existing_comment_ids(&ids)
            .await?
            .into_iter()
            .collect();

        Ok(candidates
            .into_iter()
            .filter(|c| !existing.contains(&c.id))
            .collect())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// All analyses of `user_id`, newest first.
    pub async fn list_analyses(&self, user_id: DbId) -> PipelineResult<Vec<VideoAnalysis>> {
        Ok(self.store.list_analyses(user_id).await?)
    }

    /// One analysis with its per-classification counts.
    pub async fn get_analysis_with_stats(
        &self,
        analysis_id: DbId,
        user_id: DbId,
    ) -> PipelineResult<AnalysisWithStats> {
        let analysis = self.get_analysis(analysis_id, user_id).await?;
        let stats = self.store.analysis_stats(analysis.id).await?;
        Ok(AnalysisWithStats {
            analysis: analysis.to_response(),
            stats,
        })
    }

    /// Every comment stored for an analysis, oldest first.
    pub async fn get_analysis_results(
        &self,
        analysis_id: DbId,
        user_id: DbId,
    ) -> PipelineResult<Vec<AnalyzedComment>> {
        let analysis = self.get_analysis(analysis_id, user_id).await?;
        Ok(self.store.list_comments(analysis.id, user_id).await?)
    }

    /// Load an analysis owned by `user_id`. Someone else's analysis is `NotFound`.
    pub async fn get_analysis(
        &self,
        analysis_id: DbId,
        user_id: DbId,
    ) -> PipelineResult<VideoAnalysis> {
        self.store
            .find_analysis(analysis_id, user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("video analysis", analysis_id).into())
    }
}

/// Top-level comments with a well-formed id, first occurrence of each id only.
fn unique_valid_comments(analysis_id: DbId, threads: Vec<FetchedThread>) -> Vec<FetchedComment> {
    let mut seen = HashSet::new();
    threads
        .into_iter()
        .map(|thread| thread.top_level)
        .filter(|comment| {
            if !is_top_level_comment_id(&comment.id) {
                tracing::warn!(
                    analysis_id,
                    youtube_comment_id = %comment.id,
                    "Skipping comment with malformed id"
                );
                return false;
            }
            seen.insert(comment.id.clone())
        })
        .collect()
}

pub(crate) fn saturating_i32(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;
    use judiguard_core::status::{AnalysisStatus, Classification};
    use judiguard_youtube::YouTubeError;

    use super::*;
    use crate::testing::*;

    const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    #[tokio::test]
    async fn new_comments_are_classified_and_persisted() {
        let store = Arc::new(MemoryStore::default());
        store.seed_comment(1, "UgExisting", Classification::NonJudi);
        let api = Arc::new(FakeYouTube::with_threads(&[
            ("UgExisting", "nice video"),
            ("UgSpam", "slot gacor hari ini"),
            ("UgFine", "great explanation"),
        ]));
        let classifier = Arc::new(KeywordClassifier::default());
        let svc = analysis_service(&store, &api, &classifier);

        let analysis = svc.start_analysis(1, URL).await.unwrap();

        assert_eq!(analysis.status(), AnalysisStatus::Completed);
        assert_eq!(analysis.total_comments_fetched, 3);
        assert_eq!(analysis.total_comments_analyzed, 2);
        assert_eq!(analysis.video_title.as_deref(), Some("Test video"));
        assert!(analysis.completed_at.is_some());
        assert_eq!(classifier.calls(), 2);

        let stored = svc.get_analysis_results(analysis.id, 1).await.unwrap();
        let labels: Vec<_> = stored
            .iter()
            .map(|c| (c.youtube_comment_id.as_str(), c.classification()))
            .collect();
        assert!(labels.contains(&("UgSpam", Classification::Judi)));
        assert!(labels.contains(&("UgFine", Classification::NonJudi)));
    }

    #[tokio::test]
    async fn rerun_does_not_duplicate_comments() {
        let store = Arc::new(MemoryStore::default());
        let api = Arc::new(FakeYouTube::with_threads(&[
            ("UgOne", "first"),
            ("UgTwo", "slot gacor"),
        ]));
        let classifier = Arc::new(KeywordClassifier::default());
        let svc = analysis_service(&store, &api, &classifier);

        let first = svc.start_analysis(1, URL).await.unwrap();
        let second = svc.start_analysis(1, URL).await.unwrap();

        assert_eq!(first.total_comments_analyzed, 2);
        assert_eq!(second.total_comments_fetched, 2);
        assert_eq!(second.total_comments_analyzed, 0);
        assert_eq!(second.status(), AnalysisStatus::Completed);
        assert_eq!(store.comments().len(), 2);
    }

    #[tokio::test]
    async fn duplicate_and_malformed_ids_in_one_fetch_are_dropped() {
        let store = Arc::new(MemoryStore::default());
        let api = Arc::new(FakeYouTube::with_threads(&[
            ("UgSame", "first copy"),
            ("UgSame", "second copy"),
            ("not-a-comment-id", "weird"),
        ]));
        let classifier = Arc::new(KeywordClassifier::default());
        let svc = analysis_service(&store, &api, &classifier);

        let analysis = svc.start_analysis(1, URL).await.unwrap();

        assert_eq!(analysis.total_comments_fetched, 3);
        assert_eq!(analysis.total_comments_analyzed, 1);
        assert_eq!(store.comments()[0].text_original, "first copy");
    }

    #[tokio::test]
    async fn classifier_failure_is_stored_as_error_analysis() {
        let store = Arc::new(MemoryStore::default());
        let api = Arc::new(FakeYouTube::with_threads(&[("UgBoom", "classifier explodes")]));
        let classifier = Arc::new(KeywordClassifier::default());
        let svc = analysis_service(&store, &api, &classifier);

        let analysis = svc.start_analysis(1, URL).await.unwrap();

        assert_eq!(analysis.status(), AnalysisStatus::Completed);
        let comment = &store.comments()[0];
        assert_eq!(comment.classification(), Classification::ErrorAnalysis);
        assert_eq!(comment.confidence_score, 0.0);
    }

    #[tokio::test]
    async fn video_without_comments_completes_empty() {
        let store = Arc::new(MemoryStore::default());
        let api = Arc::new(FakeYouTube::default());
        let classifier = Arc::new(KeywordClassifier::default());
        let svc = analysis_service(&store, &api, &classifier);

        let analysis = svc.start_analysis(1, URL).await.unwrap();

        assert_eq!(analysis.status(), AnalysisStatus::Completed);
        assert_eq!(analysis.total_comments_fetched, 0);
        assert_eq!(analysis.total_comments_analyzed, 0);
        assert_eq!(classifier.calls(), 0);
    }

    #[tokio::test]
    async fn persistence_failures_are_counted_not_fatal() {
        let store = Arc::new(MemoryStore::default());
        store.fail_insert_of("UgBroken");
        let api = Arc::new(FakeYouTube::with_threads(&[
            ("UgOk", "hello"),
            ("UgBroken", "hello again"),
        ]));
        let classifier = Arc::new(KeywordClassifier::default());
        let svc = analysis_service(&store, &api, &classifier);

        let analysis = svc.start_analysis(1, URL).await.unwrap();

        assert_eq!(analysis.status(), AnalysisStatus::Completed);
        assert_eq!(analysis.total_comments_analyzed, 1);
    }

    #[tokio::test]
    async fn fetch_failure_stamps_analysis_failed() {
        let store = Arc::new(MemoryStore::default());
        let api = Arc::new(FakeYouTube::default());
        api.fail_next_listing(YouTubeError::QuotaExceeded);
        let classifier = Arc::new(KeywordClassifier::default());
        let svc = analysis_service(&store, &api, &classifier);

        let err = svc.start_analysis(1, URL).await.unwrap_err();
        assert_matches!(err, PipelineError::YouTube(YouTubeError::QuotaExceeded));

        let analysis = store.only_analysis();
        assert_eq!(analysis.status(), AnalysisStatus::Failed);
        assert!(analysis.error_message.unwrap().contains("quota"));
    }

    #[tokio::test]
    async fn abandoned_run_still_completes() {
        let store = Arc::new(MemoryStore::default());
        let api = Arc::new(FakeYouTube::with_threads(&[
            ("UgSlowA", "slot gacor"),
            ("UgSlowB", "nice"),
        ]));
        let classifier = Arc::new(KeywordClassifier::slow(Duration::from_millis(200)));
        let svc = analysis_service(&store, &api, &classifier);

        let abandoned =
            tokio::time::timeout(Duration::from_millis(20), svc.start_analysis(1, URL)).await;
        assert!(abandoned.is_err());
        let analysis_id = store.only_analysis().id;
        assert_eq!(store.analysis(analysis_id).status(), AnalysisStatus::Processing);

        let analysis = store
            .wait_until_not(analysis_id, AnalysisStatus::Processing)
            .await;
        assert_eq!(analysis.status(), AnalysisStatus::Completed);
        assert_eq!(analysis.total_comments_analyzed, 2);
        assert_eq!(store.comments().len(), 2);
    }

    #[tokio::test]
    async fn invalid_url_is_rejected_before_any_io() {
        let store = Arc::new(MemoryStore::default());
        let api = Arc::new(FakeYouTube::default());
        let classifier = Arc::new(KeywordClassifier::default());
        let svc = analysis_service(&store, &api, &classifier);

        let err = svc.start_analysis(1, "https://example.com/nope").await.unwrap_err();
        assert_matches!(err, PipelineError::Core(CoreError::Validation(_)));
        assert!(store.analyses().is_empty());
    }

    #[tokio::test]
    async fn unlinked_account_is_unauthorized() {
        let store = Arc::new(MemoryStore::default());
        let classifier = Arc::new(KeywordClassifier::default());
        let svc = AnalysisService::new(
            store.clone(),
            Arc::new(FakeConnector::unauthorized()),
            classifier,
            PipelineConfig::default(),
        );

        let err = svc.start_analysis(1, URL).await.unwrap_err();
        assert_matches!(err, PipelineError::YouTube(YouTubeError::Unauthorized(_)));
        assert!(store.analyses().is_empty());
    }

    #[tokio::test]
    async fn other_users_analysis_is_not_found() {
        let store = Arc::new(MemoryStore::default());
        let analysis_id = store.seed_analysis(1, AnalysisStatus::Completed);
        let api = Arc::new(FakeYouTube::default());
        let classifier = Arc::new(KeywordClassifier::default());
        let svc = analysis_service(&store, &api, &classifier);

        let err = svc.get_analysis_results(analysis_id, 2).await.unwrap_err();
        assert_matches!(err, PipelineError::Core(CoreError::NotFound { .. }));

        let err = svc.get_analysis_with_stats(analysis_id, 2).await.unwrap_err();
        assert_matches!(err, PipelineError::Core(CoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn stats_count_each_label() {
        let store = Arc::new(MemoryStore::default());
        let api = Arc::new(FakeYouTube::with_threads(&[
            ("UgA", "slot gacor"),
            ("UgB", "judi online maxwin gacor"),
            ("UgC", "lovely"),
        ]));
        let classifier = Arc::new(KeywordClassifier::default());
        let svc = analysis_service(&store, &api, &classifier);

        let analysis = svc.start_analysis(1, URL).await.unwrap();
        let with_stats = svc.get_analysis_with_stats(analysis.id, 1).await.unwrap();

        assert_eq!(with_stats.stats.judi, 2);
        assert_eq!(with_stats.stats.non_judi, 1);
        assert_eq!(with_stats.stats.deleted_on_youtube, 0);
    }
}
