//! Video lookup, comment pagination, and ownership-checked moderation.
//!
//! Every function takes the [`YouTubeApi`] bound to the acting user's
//! credentials.

use crate::api::{CommentThreadQuery, YouTubeApi};
use crate::error::YouTubeError;
use crate::types::{FetchedThread, ModerationStatus, VideoDetails};

/// Upper bound the API accepts for `maxResults` on `commentThreads.list`.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Fetch metadata for one video.
///
/// Fails with [`YouTubeError::NotFound`] if the API returns no items.
pub async fn get_video_details(
    api: &dyn YouTubeApi,
    video_id: &str,
) -> Result<VideoDetails, YouTubeError> {
    let video = api
        .list_videos(video_id)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| YouTubeError::NotFound {
            resource: "video",
            id: video_id.to_string(),
        })?;
    Ok(VideoDetails::from(video))
}

/// Page through a video's comment threads, newest first.
///
/// Collects whole threads until the API reports no further page or
/// `total_limit` valid threads have been gathered. Each page requests at most
/// `min(page_size, remaining)` items. Malformed threads are skipped and do not
/// count towards the limit.
pub async fn fetch_comments(
    api: &dyn YouTubeApi,
    video_id: &str,
    user_id: i64,
    page_size: u32,
    total_limit: usize,
) -> Result<Vec<FetchedThread>, YouTubeError> {
    let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
    let mut threads: Vec<FetchedThread> = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let remaining = total_limit.saturating_sub(threads.len());
        if remaining == 0 {
            break;
        }
        let max_results = page_size.min(u32::try_from(remaining).unwrap_or(u32::MAX));

        let page = api
            .list_comment_threads(&CommentThreadQuery {
                video_id: video_id.to_string(),
                max_results,
                page_token: page_token.take(),
            })
            .await
            .inspect_err(|e| {
                tracing::error!(video_id, user_id, error = %e, "Failed to fetch comment threads");
            })?;

        for raw in &page.items {
            if threads.len() >= total_limit {
                break;
            }
            match FetchedThread::from_raw(raw) {
                Some(thread) => threads.push(thread),
                None => tracing::warn!(
                    video_id,
                    thread_id = raw.id.as_deref().unwrap_or("<missing>"),
                    "Skipping malformed comment thread"
                ),
            }
        }

        tracing::debug!(
            video_id,
            fetched = threads.len(),
            has_next_page = page.next_page_token.is_some(),
            "Fetched comment thread page"
        );

        match page.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => break,
        }
    }

    tracing::info!(video_id, user_id, total = threads.len(), "Comment threads fetched");
    Ok(threads)
}

/// Channel id of the authenticated account, if it has one.
pub async fn my_channel_id(api: &dyn YouTubeApi) -> Result<Option<String>, YouTubeError> {
    Ok(api.list_my_channels().await?.into_iter().next().map(|c| c.id))
}

/// Permanently delete a comment the authenticated channel authored.
///
/// The comment's author channel must equal the authenticated channel;
/// otherwise no delete is issued and [`YouTubeError::NotCommentOwner`] is
/// returned with both ids.
pub async fn delete_comment(api: &dyn YouTubeApi, comment_id: &str) -> Result<(), YouTubeError> {
    let comment = api
        .get_comment(comment_id)
        .await?
        .ok_or_else(|| YouTubeError::NotFound {
            resource: "comment",
            id: comment_id.to_string(),
        })?;

    let author_channel_id = comment
        .snippet
        .as_ref()
        .and_then(|s| s.author_channel_id.as_ref())
        .and_then(|a| a.value.clone());
    let my_channel = my_channel_id(api).await?;

    match (&my_channel, &author_channel_id) {
        (Some(mine), Some(author)) if mine == author => {}
        _ => {
            return Err(YouTubeError::NotCommentOwner {
                your_channel_id: my_channel,
                comment_author_id: author_channel_id,
            });
        }
    }

    api.delete_comment(comment_id).await?;
    tracing::info!(comment_id, "Comment deleted on YouTube");
    Ok(())
}

/// Change the moderation state of a top-level comment on a video the
/// authenticated channel owns.
///
/// Fails with [`YouTubeError::NotChannelOwner`] when the thread's video
/// belongs to another channel.
pub async fn moderate_comment(
    api: &dyn YouTubeApi,
    thread_id: &str,
    status: ModerationStatus,
) -> Result<(), YouTubeError> {
    let thread = api
        .get_comment_thread(thread_id)
        .await?
        .ok_or_else(|| YouTubeError::NotFound {
            resource: "comment thread",
            id: thread_id.to_string(),
        })?;

    let video_owner = thread.snippet.as_ref().and_then(|s| s.channel_id.clone());
    let my_channel = my_channel_id(api).await?;

    match (&my_channel, &video_owner) {
        (Some(mine), Some(owner)) if mine == owner => {}
        _ => {
            return Err(YouTubeError::NotChannelOwner {
                your_channel_id: my_channel,
                video_owner_channel_id: video_owner,
            });
        }
    }

    api.set_moderation_status(thread_id, status).await?;
    tracing::info!(thread_id, %status, "Comment moderation status updated");
    Ok(())
}
