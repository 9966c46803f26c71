//! YouTube Data API v3 resource shapes and the validated domain types built
//! from them.
//!
//! Raw resources mirror the API's JSON and are lenient: every field the
//! pipeline depends on is optional so a malformed item can be detected and
//! skipped instead of failing the whole page.

use judiguard_core::types::Timestamp;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Raw API resources
// ---------------------------------------------------------------------------

/// A paginated list response (`videos.list`, `commentThreads.list`, ...).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub snippet: Option<VideoSnippet>,
    pub content_details: Option<VideoContentDetails>,
    pub statistics: Option<VideoStatistics>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    pub title: Option<String>,
    pub description: Option<String>,
    pub channel_id: Option<String>,
    pub channel_title: Option<String>,
    pub published_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoContentDetails {
    /// ISO 8601 duration, e.g. `PT4M13S`.
    pub duration: Option<String>,
}

/// Counters are transported as decimal strings by the API.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
    pub view_count: Option<String>,
    pub like_count: Option<String>,
    pub comment_count: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThread {
    pub id: Option<String>,
    pub snippet: Option<CommentThreadSnippet>,
    pub replies: Option<CommentThreadReplies>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThreadSnippet {
    /// Channel that owns the video the thread belongs to.
    pub channel_id: Option<String>,
    pub video_id: Option<String>,
    pub top_level_comment: Option<Comment>,
    pub total_reply_count: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommentThreadReplies {
    #[serde(default = "Vec::new")]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Comment {
    pub id: Option<String>,
    pub snippet: Option<CommentSnippet>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentSnippet {
    pub video_id: Option<String>,
    pub text_original: Option<String>,
    pub text_display: Option<String>,
    pub author_display_name: Option<String>,
    pub author_profile_image_url: Option<String>,
    pub author_channel_id: Option<AuthorChannelId>,
    pub like_count: Option<i64>,
    pub published_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthorChannelId {
    pub value: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Channel {
    pub id: String,
    pub snippet: Option<ChannelSnippet>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChannelSnippet {
    pub title: Option<String>,
}

/// Target state for `comments.setModerationStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationStatus {
    HeldForReview,
    Published,
    Rejected,
}

impl ModerationStatus {
    /// Value expected by the API's `moderationStatus` parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            ModerationStatus::HeldForReview => "heldForReview",
            ModerationStatus::Published => "published",
            ModerationStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Validated domain types
// ---------------------------------------------------------------------------

/// Video metadata returned by [`crate::service::get_video_details`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoDetails {
    pub id: String,
    pub title: Option<String>,
    pub channel_id: Option<String>,
    pub channel_title: Option<String>,
    pub published_at: Option<Timestamp>,
    pub duration: Option<String>,
    pub comment_count: Option<u64>,
}

impl From<Video> for VideoDetails {
    fn from(video: Video) -> Self {
        let snippet = video.snippet;
        VideoDetails {
            id: video.id,
            title: snippet.as_ref().and_then(|s| s.title.clone()),
            channel_id: snippet.as_ref().and_then(|s| s.channel_id.clone()),
            channel_title: snippet.as_ref().and_then(|s| s.channel_title.clone()),
            published_at: snippet.as_ref().and_then(|s| s.published_at),
            duration: video.content_details.and_then(|c| c.duration),
            comment_count: video
                .statistics
                .and_then(|s| s.comment_count)
                .and_then(|c| c.parse().ok()),
        }
    }
}

/// A comment with every field the pipeline relies on present.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedComment {
    pub id: String,
    pub parent_id: Option<String>,
    pub text_original: String,
    pub text_display: String,
    pub author_display_name: Option<String>,
    pub author_channel_id: Option<String>,
    pub author_profile_image_url: Option<String>,
    pub like_count: i64,
    pub published_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl FetchedComment {
    /// Validate a raw comment. Returns `None` if the id or snippet is missing.
    pub fn from_raw(raw: &Comment) -> Option<Self> {
        let id = raw.id.as_deref().filter(|id| !id.trim().is_empty())?;
        let snippet = raw.snippet.as_ref()?;
        let text_original = snippet
            .text_original
            .clone()
            .or_else(|| snippet.text_display.clone())
            .unwrap_or_default();
        let text_display = snippet
            .text_display
            .clone()
            .unwrap_or_else(|| text_original.clone());

        Some(FetchedComment {
            id: id.to_string(),
            parent_id: snippet.parent_id.clone(),
            text_original,
            text_display,
            author_display_name: snippet.author_display_name.clone(),
            author_channel_id: snippet
                .author_channel_id
                .as_ref()
                .and_then(|a| a.value.clone()),
            author_profile_image_url: snippet.author_profile_image_url.clone(),
            like_count: snippet.like_count.unwrap_or(0),
            published_at: snippet.published_at,
            updated_at: snippet.updated_at,
        })
    }
}

/// A comment thread: a top-level comment and the replies delivered inline.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedThread {
    pub thread_id: String,
    /// Channel owning the video.
    pub channel_id: Option<String>,
    pub top_level: FetchedComment,
    pub replies: Vec<FetchedComment>,
}

impl FetchedThread {
    /// Validate a raw thread.
    ///
    /// Returns `None` when the thread id, snippet, top-level comment, or its
    /// id/snippet are missing. Malformed inline replies are dropped.
    pub fn from_raw(raw: &CommentThread) -> Option<Self> {
        let snippet = raw.snippet.as_ref()?;
        let top_level = FetchedComment::from_raw(snippet.top_level_comment.as_ref()?)?;
        let thread_id = raw
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| top_level.id.clone());
        let replies = raw
            .replies
            .as_ref()
            .map(|r| r.comments.iter().filter_map(FetchedComment::from_raw).collect())
            .unwrap_or_default();

        Some(FetchedThread {
            thread_id,
            channel_id: snippet.channel_id.clone(),
            top_level,
            replies,
        })
    }
}
