//! In-memory fakes for the pipeline's seams.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use judiguard_classifier::{ClassificationResult, CommentClassifier, MODEL_VERSION};
use judiguard_core::status::{AnalysisStatus, Classification};
use judiguard_core::types::{DbId, Timestamp};
use judiguard_db::models::analyzed_comment::{
    AnalyzedComment, CommentDeletionOutcome, CreateAnalyzedComment,
};
use judiguard_db::models::video_analysis::{AnalysisStats, VideoAnalysis};
use judiguard_youtube::api::CommentThreadQuery;
use judiguard_youtube::types::{
    Channel, Comment, CommentThread, ListResponse, ModerationStatus, Video,
};
use judiguard_youtube::{YouTubeApi, YouTubeError};
use serde_json::json;

use crate::config::PipelineConfig;
use crate::connector::YouTubeConnector;
use crate::ingest::AnalysisService;
use crate::store::AnalysisStore;

pub const MY_CHANNEL: &str = "UCmychannel";

pub fn analysis_service(
    store: &Arc<MemoryStore>,
    api: &Arc<FakeYouTube>,
    classifier: &Arc<KeywordClassifier>,
) -> AnalysisService {
    AnalysisService::new(
        store.clone(),
        Arc::new(FakeConnector {
            api: Some(api.clone()),
        }),
        classifier.clone(),
        PipelineConfig::default(),
    )
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Default)]
struct StoreState {
    next_id: DbId,
    analyses: Vec<VideoAnalysis>,
    comments: Vec<AnalyzedComment>,
    failing_inserts: HashSet<String>,
    fail_finish: bool,
}

impl StoreState {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn analysis_mut(&mut self, id: DbId) -> Option<&mut VideoAnalysis> {
        self.analyses.iter_mut().find(|a| a.id == id)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

fn new_analysis(id: DbId, user_id: DbId, video_id: &str, status: AnalysisStatus) -> VideoAnalysis {
    let now = Utc::now();
    VideoAnalysis {
        id,
        user_id,
        youtube_video_id: video_id.to_string(),
        video_title: None,
        status_id: status.id(),
        total_comments_fetched: 0,
        total_comments_analyzed: 0,
        error_message: None,
        last_batch_deletion_attempt_at: None,
        last_batch_deletion_success_count: None,
        last_batch_deletion_failure_count: None,
        requested_at: now,
        processing_started_at: Some(now),
        completed_at: None,
        created_at: now,
        updated_at: now,
    }
}

fn new_comment(id: DbId, input: &CreateAnalyzedComment) -> AnalyzedComment {
    let now = Utc::now();
    AnalyzedComment {
        id,
        video_analysis_id: input.video_analysis_id,
        user_id: input.user_id,
        youtube_video_id: input.youtube_video_id.clone(),
        youtube_comment_id: input.youtube_comment_id.clone(),
        parent_youtube_comment_id: input.parent_youtube_comment_id.clone(),
        text_original: input.text_original.clone(),
        text_display: input.text_display.clone(),
        author_display_name: input.author_display_name.clone(),
        author_channel_id: input.author_channel_id.clone(),
        author_profile_image_url: input.author_profile_image_url.clone(),
        like_count: input.like_count,
        published_at: input.published_at,
        comment_updated_at: input.comment_updated_at,
        classification_id: input.classification.id(),
        confidence_score: input.confidence_score,
        model_version: Some(input.model_version.clone()),
        is_deleted_on_youtube: false,
        deletion_attempted_at: None,
        deletion_error: None,
        moderation_status: None,
        created_at: now,
        updated_at: now,
    }
}

impl MemoryStore {
    pub fn seed_analysis(&self, user_id: DbId, status: AnalysisStatus) -> DbId {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state
            .analyses
            .push(new_analysis(id, user_id, "dQw4w9WgXcQ", status));
        id
    }

    /// Seed a comment under a fresh completed analysis.
    pub fn seed_comment(
        &self,
        user_id: DbId,
        youtube_comment_id: &str,
        classification: Classification,
    ) -> DbId {
        let analysis_id = self.seed_analysis(user_id, AnalysisStatus::Completed);
        self.seed_comment_in(analysis_id, user_id, youtube_comment_id, classification)
    }

    pub fn seed_comment_in(
        &self,
        analysis_id: DbId,
        user_id: DbId,
        youtube_comment_id: &str,
        classification: Classification,
    ) -> DbId {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        let input = CreateAnalyzedComment {
            video_analysis_id: analysis_id,
            user_id,
            youtube_video_id: "dQw4w9WgXcQ".into(),
            youtube_comment_id: youtube_comment_id.into(),
            parent_youtube_comment_id: None,
            text_original: "seeded".into(),
            text_display: "seeded".into(),
            author_display_name: None,
            author_channel_id: None,
            author_profile_image_url: None,
            like_count: 0,
            published_at: None,
            comment_updated_at: None,
            classification,
            confidence_score: 0.9,
            model_version: MODEL_VERSION.into(),
        };
        state.comments.push(new_comment(id, &input));
        id
    }

    pub fn mark_deleted(&self, id: DbId) {
        let mut state = self.state.lock().unwrap();
        if let Some(c) = state.comments.iter_mut().find(|c| c.id == id) {
            c.is_deleted_on_youtube = true;
        }
    }

    pub fn fail_insert_of(&self, youtube_comment_id: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_inserts
            .insert(youtube_comment_id.to_string());
    }

    pub fn fail_finish_batch_deletion(&self) {
        self.state.lock().unwrap().fail_finish = true;
    }

    pub fn analyses(&self) -> Vec<VideoAnalysis> {
        self.state.lock().unwrap().analyses.clone()
    }

    pub fn analysis(&self, id: DbId) -> VideoAnalysis {
        self.analyses().into_iter().find(|a| a.id == id).unwrap()
    }

    pub fn only_analysis(&self) -> VideoAnalysis {
        let analyses = self.analyses();
        assert_eq!(analyses.len(), 1);
        analyses.into_iter().next().unwrap()
    }

    pub fn comments(&self) -> Vec<AnalyzedComment> {
        self.state.lock().unwrap().comments.clone()
    }

    pub fn comment(&self, id: DbId) -> AnalyzedComment {
        self.comments().into_iter().find(|c| c.id == id).unwrap()
    }

    /// Poll until analysis `id` leaves `from`, giving up after two seconds.
    pub async fn wait_until_not(&self, id: DbId, from: AnalysisStatus) -> VideoAnalysis {
        for _ in 0..200 {
            let analysis = self.analysis(id);
            if analysis.status() != from {
                return analysis;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("analysis {id} stayed {from}");
    }

    fn update_analysis(&self, id: DbId, f: impl FnOnce(&mut VideoAnalysis)) {
        if let Some(a) = self.state.lock().unwrap().analysis_mut(id) {
            f(a);
            a.updated_at = Utc::now();
        }
    }
}

#[async_trait]
impl AnalysisStore for MemoryStore {
    async fn create_analysis(
        &self,
        user_id: DbId,
        youtube_video_id: &str,
    ) -> Result<VideoAnalysis, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        let analysis = new_analysis(id, user_id, youtube_video_id, AnalysisStatus::Processing);
        state.analyses.push(analysis.clone());
        Ok(analysis)
    }

    async fn find_analysis(
        &self,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<VideoAnalysis>, sqlx::Error> {
        Ok(self
            .analyses()
            .into_iter()
            .find(|a| a.id == id && a.user_id == user_id))
    }

    async fn list_analyses(&self, user_id: DbId) -> Result<Vec<VideoAnalysis>, sqlx::Error> {
        let mut analyses: Vec<_> = self
            .analyses()
            .into_iter()
            .filter(|a| a.user_id == user_id)
            .collect();
        analyses.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(analyses)
    }

    async fn set_title(&self, id: DbId, title: &str) -> Result<(), sqlx::Error> {
        self.update_analysis(id, |a| a.video_title = Some(title.to_string()));
        Ok(())
    }

    async fn set_fetched_count(&self, id: DbId, fetched: i32) -> Result<(), sqlx::Error> {
        self.update_analysis(id, |a| a.total_comments_fetched = fetched);
        Ok(())
    }

    async fn mark_completed(&self, id: DbId, analyzed: i32) -> Result<(), sqlx::Error> {
        self.update_analysis(id, |a| {
            a.total_comments_analyzed = analyzed;
            a.status_id = AnalysisStatus::Completed.id();
            a.completed_at = Some(Utc::now());
        });
        Ok(())
    }

    async fn mark_failed(&self, id: DbId, error_message: &str) -> Result<(), sqlx::Error> {
        self.update_analysis(id, |a| {
            a.status_id = AnalysisStatus::Failed.id();
            a.error_message = Some(error_message.to_string());
            a.completed_at = Some(Utc::now());
        });
        Ok(())
    }

    async fn set_status(&self, id: DbId, status: AnalysisStatus) -> Result<(), sqlx::Error> {
        self.update_analysis(id, |a| a.status_id = status.id());
        Ok(())
    }

    async fn begin_batch_deletion(
        &self,
        id: DbId,
        attempted_at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        let Some(a) = state.analysis_mut(id) else {
            return Ok(false);
        };
        if !a.status().allows_batch_deletion() {
            return Ok(false);
        }
        a.status_id = AnalysisStatus::DeletingClassifiedComments.id();
        a.last_batch_deletion_attempt_at = Some(attempted_at);
        Ok(true)
    }

    async fn finish_batch_deletion(
        &self,
        id: DbId,
        status: AnalysisStatus,
        success_count: i32,
        failure_count: i32,
    ) -> Result<(), sqlx::Error> {
        if self.state.lock().unwrap().fail_finish {
            return Err(sqlx::Error::PoolTimedOut);
        }
        self.update_analysis(id, |a| {
            a.status_id = status.id();
            a.last_batch_deletion_success_count = Some(success_count);
            a.last_batch_deletion_failure_count = Some(failure_count);
        });
        Ok(())
    }

    async fn existing_comment_ids(
        &self,
        youtube_comment_ids: &[String],
    ) -> Result<Vec<String>, sqlx::Error> {
        Ok(self
            .comments()
            .into_iter()
            .map(|c| c.youtube_comment_id)
            .filter(|id| youtube_comment_ids.contains(id))
            .collect())
    }

    async fn insert_comment(
        &self,
        input: &CreateAnalyzedComment,
    ) -> Result<Option<AnalyzedComment>, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        if state.failing_inserts.contains(&input.youtube_comment_id) {
            return Err(sqlx::Error::PoolTimedOut);
        }
        if state
            .comments
            .iter()
            .any(|c| c.youtube_comment_id == input.youtube_comment_id)
        {
            return Ok(None);
        }
        let id = state.next_id();
        let comment = new_comment(id, input);
        state.comments.push(comment.clone());
        Ok(Some(comment))
    }

    async fn list_comments(
        &self,
        analysis_id: DbId,
        user_id: DbId,
    ) -> Result<Vec<AnalyzedComment>, sqlx::Error> {
        Ok(self
            .comments()
            .into_iter()
            .filter(|c| c.video_analysis_id == analysis_id && c.user_id == user_id)
            .collect())
    }

    async fn list_undeleted_comments(
        &self,
        analysis_id: DbId,
        user_id: DbId,
        classification: Classification,
    ) -> Result<Vec<AnalyzedComment>, sqlx::Error> {
        Ok(self
            .list_comments(analysis_id, user_id)
            .await?
            .into_iter()
            .filter(|c| c.classification() == classification && !c.is_deleted_on_youtube)
            .collect())
    }

    async fn find_comment(
        &self,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<AnalyzedComment>, sqlx::Error> {
        Ok(self
            .comments()
            .into_iter()
            .find(|c| c.id == id && c.user_id == user_id))
    }

    async fn record_deletion_outcome(
        &self,
        id: DbId,
        outcome: &CommentDeletionOutcome,
    ) -> Result<Option<AnalyzedComment>, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        let Some(c) = state.comments.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        c.is_deleted_on_youtube = outcome.is_deleted_on_youtube;
        c.deletion_error = outcome.deletion_error.clone();
        if outcome.moderation_status.is_some() {
            c.moderation_status = outcome.moderation_status.clone();
        }
        c.deletion_attempted_at = Some(outcome.attempted_at);
        Ok(Some(c.clone()))
    }

    async fn analysis_stats(&self, analysis_id: DbId) -> Result<AnalysisStats, sqlx::Error> {
        let mut stats = AnalysisStats::default();
        for c in self
            .comments()
            .iter()
            .filter(|c| c.video_analysis_id == analysis_id)
        {
            match c.classification() {
                Classification::Judi => stats.judi += 1,
                Classification::NonJudi => stats.non_judi += 1,
                Classification::PendingAnalysis => stats.pending_analysis += 1,
                Classification::ErrorAnalysis => stats.error_analysis += 1,
            }
            if c.is_deleted_on_youtube {
                stats.deleted_on_youtube += 1;
            }
        }
        Ok(stats)
    }
}

// ---------------------------------------------------------------------------
// YouTube
// ---------------------------------------------------------------------------

pub struct FakeYouTube {
    threads: Vec<CommentThread>,
    my_channel: String,
    video_owner: String,
    listing_error: Mutex<Option<YouTubeError>>,
    authors: Mutex<HashMap<String, String>>,
    failing_deletes: Mutex<HashSet<String>>,
    delete_delay: Option<Duration>,
    deleted: Mutex<Vec<String>>,
    moderated: Mutex<Vec<String>>,
}

impl Default for FakeYouTube {
    fn default() -> Self {
        Self {
            threads: Vec::new(),
            my_channel: MY_CHANNEL.to_string(),
            video_owner: MY_CHANNEL.to_string(),
            listing_error: Mutex::new(None),
            authors: Mutex::new(HashMap::new()),
            failing_deletes: Mutex::new(HashSet::new()),
            delete_delay: None,
            deleted: Mutex::new(Vec::new()),
            moderated: Mutex::new(Vec::new()),
        }
    }
}

impl FakeYouTube {
    /// One page of threads, each `(comment id, text)`.
    pub fn with_threads(threads: &[(&str, &str)]) -> Self {
        Self {
            threads: threads
                .iter()
                .map(|(id, text)| {
                    serde_json::from_value(json!({
                        "id": id,
                        "snippet": {
                            "channelId": MY_CHANNEL,
                            "videoId": "dQw4w9WgXcQ",
                            "topLevelComment": {
                                "id": id,
                                "snippet": {
                                    "textOriginal": text,
                                    "textDisplay": text,
                                    "authorDisplayName": "viewer",
                                    "authorChannelId": { "value": "UCviewer" },
                                    "likeCount": 1,
                                    "publishedAt": "2026-05-01T10:00:00Z"
                                }
                            }
                        }
                    }))
                    .unwrap()
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn owned_by(mut self, channel_id: &str) -> Self {
        self.video_owner = channel_id.to_string();
        self
    }

    /// Every `comments.delete` call takes `delay` before answering.
    pub fn slow_deletes(mut self, delay: Duration) -> Self {
        self.delete_delay = Some(delay);
        self
    }

    pub fn author(&self, comment_id: &str, channel_id: &str) {
        self.authors
            .lock()
            .unwrap()
            .insert(comment_id.to_string(), channel_id.to_string());
    }

    pub fn fail_delete_of(&self, comment_id: &str) {
        self.failing_deletes
            .lock()
            .unwrap()
            .insert(comment_id.to_string());
    }

    pub fn fail_next_listing(&self, err: YouTubeError) {
        *self.listing_error.lock().unwrap() = Some(err);
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn moderated(&self) -> Vec<String> {
        self.moderated.lock().unwrap().clone()
    }
}

#[async_trait]
impl YouTubeApi for FakeYouTube {
    async fn list_videos(&self, video_id: &str) -> Result<Vec<Video>, YouTubeError> {
        Ok(vec![serde_json::from_value(json!({
            "id": video_id,
            "snippet": { "title": "Test video", "channelId": self.video_owner }
        }))
        .unwrap()])
    }

    async fn list_comment_threads(
        &self,
        _query: &CommentThreadQuery,
    ) -> Result<ListResponse<CommentThread>, YouTubeError> {
        if let Some(err) = self.listing_error.lock().unwrap().take() {
            return Err(err);
        }
        Ok(ListResponse {
            items: self.threads.clone(),
            next_page_token: None,
        })
    }

    async fn get_comment_thread(
        &self,
        thread_id: &str,
    ) -> Result<Option<CommentThread>, YouTubeError> {
        Ok(Some(
            serde_json::from_value(json!({
                "id": thread_id,
                "snippet": {
                    "channelId": self.video_owner,
                    "topLevelComment": { "id": thread_id, "snippet": { "textOriginal": "x" } }
                }
            }))
            .unwrap(),
        ))
    }

    async fn get_comment(&self, comment_id: &str) -> Result<Option<Comment>, YouTubeError> {
        let authors = self.authors.lock().unwrap();
        Ok(authors.get(comment_id).map(|author| {
            serde_json::from_value(json!({
                "id": comment_id,
                "snippet": { "textOriginal": "x", "authorChannelId": { "value": author } }
            }))
            .unwrap()
        }))
    }

    async fn list_my_channels(&self) -> Result<Vec<Channel>, YouTubeError> {
        Ok(vec![Channel {
            id: self.my_channel.clone(),
            snippet: None,
        }])
    }

    async fn delete_comment(&self, comment_id: &str) -> Result<(), YouTubeError> {
        if let Some(delay) = self.delete_delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_deletes.lock().unwrap().contains(comment_id) {
            return Err(YouTubeError::Api {
                status: 500,
                message: "backend error".into(),
            });
        }
        self.deleted.lock().unwrap().push(comment_id.to_string());
        Ok(())
    }

    async fn set_moderation_status(
        &self,
        comment_id: &str,
        _status: ModerationStatus,
    ) -> Result<(), YouTubeError> {
        self.moderated.lock().unwrap().push(comment_id.to_string());
        Ok(())
    }
}

pub struct FakeConnector {
    api: Option<Arc<FakeYouTube>>,
}

impl FakeConnector {
    pub fn unauthorized() -> Self {
        Self { api: None }
    }
}

#[async_trait]
impl YouTubeConnector for FakeConnector {
    async fn connect(&self, _user_id: DbId) -> Result<Arc<dyn YouTubeApi>, YouTubeError> {
        // Token lookup is a round-trip in production; let other tasks run.
        tokio::task::yield_now().await;
        match &self.api {
            Some(api) => {
                let api: Arc<dyn YouTubeApi> = api.clone();
                Ok(api)
            }
            None => Err(YouTubeError::Unauthorized(
                "YouTube account is not connected".into(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Flags text mentioning "gacor"; text mentioning "explodes" simulates an
/// unreachable inference service.
#[derive(Default)]
pub struct KeywordClassifier {
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl KeywordClassifier {
    /// Every classification takes `delay` before answering.
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommentClassifier for KeywordClassifier {
    async fn classify(&self, text: &str) -> ClassificationResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if text.contains("explodes") {
            return ClassificationResult::error_sentinel();
        }
        let classification = if text.contains("gacor") {
            Classification::Judi
        } else {
            Classification::NonJudi
        };
        ClassificationResult {
            classification,
            confidence_score: 0.95,
            model_version: MODEL_VERSION.to_string(),
        }
    }
}
