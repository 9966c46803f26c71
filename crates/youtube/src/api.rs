//! The low-level YouTube Data API seam.
//!
//! One [`YouTubeApi`] value is bound to one set of credentials (a user's
//! OAuth access token or the server API key). Higher-level workflows in
//! [`crate::service`] are written against this trait so they can be exercised
//! with in-memory fakes.

use async_trait::async_trait;

use crate::error::YouTubeError;
use crate::types::{Channel, Comment, CommentThread, ListResponse, ModerationStatus, Video};

/// Parameters for one `commentThreads.list` page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentThreadQuery {
    pub video_id: String,
    pub max_results: u32,
    pub page_token: Option<String>,
}

#[async_trait]
pub trait YouTubeApi: Send + Sync {
    /// `videos.list?part=snippet,contentDetails,statistics&id=...`
    async fn list_videos(&self, video_id: &str) -> Result<Vec<Video>, YouTubeError>;

    /// One page of `commentThreads.list` for a video, newest first, plain text.
    async fn list_comment_threads(
        &self,
        query: &CommentThreadQuery,
    ) -> Result<ListResponse<CommentThread>, YouTubeError>;

    /// `commentThreads.list?id=...` for a single thread.
    async fn get_comment_thread(
        &self,
        thread_id: &str,
    ) -> Result<Option<CommentThread>, YouTubeError>;

    /// `comments.list?id=...` for a single comment.
    async fn get_comment(&self, comment_id: &str) -> Result<Option<Comment>, YouTubeError>;

    /// `channels.list?mine=true` for the authenticated account.
    async fn list_my_channels(&self) -> Result<Vec<Channel>, YouTubeError>;

    /// `comments.delete?id=...`
    async fn delete_comment(&self, comment_id: &str) -> Result<(), YouTubeError>;

    /// `comments.setModerationStatus?id=...&moderationStatus=...`
    async fn set_moderation_status(
        &self,
        comment_id: &str,
        status: ModerationStatus,
    ) -> Result<(), YouTubeError>;
}
