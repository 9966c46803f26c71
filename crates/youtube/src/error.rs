use judiguard_core::error::CoreError;

/// Errors from the YouTube adapter layer.
#[derive(Debug, thiserror::Error)]
pub enum YouTubeError {
    /// No usable credentials: account not linked, or the refresh was rejected.
    #[error("YouTube authorization required: {0}")]
    Unauthorized(String),

    /// The requested video, comment, or thread does not exist (or is not visible).
    #[error("YouTube {resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    /// The daily API quota is exhausted.
    #[error("YouTube API quota exceeded. Please try again tomorrow.")]
    QuotaExceeded,

    /// The video owner has turned comments off.
    #[error("Comments are disabled for video {video_id}")]
    CommentsDisabled { video_id: String },

    /// Any other permission failure reported by the API.
    #[error("YouTube refused the request: {0}")]
    Forbidden(String),

    /// The authenticated channel did not author the comment, so it may not be deleted.
    #[error("Comment was not written by your channel (your channel: {your_channel_id:?}, comment author: {comment_author_id:?})")]
    NotCommentOwner {
        your_channel_id: Option<String>,
        comment_author_id: Option<String>,
    },

    /// The authenticated channel does not own the video, so it may not moderate.
    #[error("Video is not owned by your channel (your channel: {your_channel_id:?}, video owner: {video_owner_channel_id:?})")]
    NotChannelOwner {
        your_channel_id: Option<String>,
        video_owner_channel_id: Option<String>,
    },

    /// The API returned an error not covered above.
    #[error("YouTube API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The HTTP request itself failed (network, DNS, TLS, body decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Reading or writing stored credentials failed.
    #[error("Credential storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for YouTubeError {
    fn from(err: sqlx::Error) -> Self {
        YouTubeError::Storage(err.to_string())
    }
}

impl From<YouTubeError> for CoreError {
    fn from(err: YouTubeError) -> Self {
        match err {
            YouTubeError::Unauthorized(msg) => CoreError::Unauthorized(msg),
            YouTubeError::NotFound { resource, id } => CoreError::NotFound {
                entity: resource,
                id,
            },
            e @ YouTubeError::QuotaExceeded => CoreError::QuotaExceeded(e.to_string()),
            e @ (YouTubeError::CommentsDisabled { .. }
            | YouTubeError::NotCommentOwner { .. }
            | YouTubeError::NotChannelOwner { .. }) => CoreError::Forbidden(e.to_string()),
            YouTubeError::Forbidden(msg) => CoreError::Forbidden(msg),
            YouTubeError::Api { status: 400, message } => CoreError::Validation(message),
            e @ (YouTubeError::Api { .. }
            | YouTubeError::Request(_)
            | YouTubeError::Storage(_)) => CoreError::Internal(e.to_string()),
        }
    }
}
