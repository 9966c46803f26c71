//! reqwest-backed implementation of [`YouTubeApi`].

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::api::{CommentThreadQuery, YouTubeApi};
use crate::error::YouTubeError;
use crate::types::{Channel, Comment, CommentThread, ListResponse, ModerationStatus, Video};

/// How requests are authorized.
#[derive(Clone)]
enum Credentials {
    /// A user's OAuth2 access token, sent as `Authorization: Bearer`.
    Bearer(String),
    /// The server API key, sent as the `key` query parameter (read-only calls).
    ApiKey(String),
}

/// HTTP client for the YouTube Data API bound to one set of credentials.
pub struct HttpYouTubeApi {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

/// Google API error envelope: `{"error": {"code", "message", "errors": [{"reason"}]}}`.
#[derive(Debug, Default, Deserialize)]
struct GoogleErrorBody {
    #[serde(default)]
    error: GoogleError,
}

#[derive(Debug, Default, Deserialize)]
struct GoogleError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<GoogleErrorItem>,
}

#[derive(Debug, Default, Deserialize)]
struct GoogleErrorItem {
    #[serde(default)]
    reason: String,
}

/// What a request was about, used to build precise errors.
struct Target<'a> {
    resource: &'static str,
    id: &'a str,
}

impl HttpYouTubeApi {
    /// Client acting as a user via their OAuth2 access token.
    pub fn with_access_token(
        client: reqwest::Client,
        base_url: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials: Credentials::Bearer(access_token.into()),
        }
    }

    /// Client using the server API key. Only public reads will succeed.
    pub fn with_api_key(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials: Credentials::ApiKey(api_key.into()),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}/{}", self.base_url, path));
        match &self.credentials {
            Credentials::Bearer(token) => builder.bearer_auth(token),
            Credentials::ApiKey(key) => builder.query(&[("key", key.as_str())]),
        }
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, translating Google's
    /// error envelope into a [`YouTubeError`] otherwise.
    async fn ensure_success(
        response: reqwest::Response,
        target: &Target<'_>,
    ) -> Result<reqwest::Response, YouTubeError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        Err(classify_error(status.as_u16(), &body, target))
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
        target: &Target<'_>,
    ) -> Result<T, YouTubeError> {
        let response = Self::ensure_success(response, target).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(
        response: reqwest::Response,
        target: &Target<'_>,
    ) -> Result<(), YouTubeError> {
        Self::ensure_success(response, target).await?;
        Ok(())
    }
}

/// Map an error response onto the adapter's error taxonomy.
fn classify_error(status: u16, body: &str, target: &Target<'_>) -> YouTubeError {
    let parsed: GoogleErrorBody = serde_json::from_str(body).unwrap_or_default();
    let reasons: Vec<&str> = parsed
        .error
        .errors
        .iter()
        .map(|e| e.reason.as_str())
        .collect();
    let message = if parsed.error.message.is_empty() {
        body.to_string()
    } else {
        parsed.error.message
    };

    let has_reason = |r: &str| reasons.contains(&r);
    if has_reason("quotaExceeded")
        || has_reason("dailyLimitExceeded")
        || message.to_lowercase().contains("quotaexceeded")
    {
        return YouTubeError::QuotaExceeded;
    }
    if has_reason("commentsDisabled") {
        return YouTubeError::CommentsDisabled {
            video_id: target.id.to_string(),
        };
    }

    match status {
        401 => YouTubeError::Unauthorized(message),
        403 => YouTubeError::Forbidden(message),
        404 => YouTubeError::NotFound {
            resource: target.resource,
            id: target.id.to_string(),
        },
        _ => YouTubeError::Api { status, message },
    }
}

#[async_trait]
impl YouTubeApi for HttpYouTubeApi {
    async fn list_videos(&self, video_id: &str) -> Result<Vec<Video>, YouTubeError> {
        let target = Target {
            resource: "video",
            id: video_id,
        };
        let response = self
            .request(reqwest::Method::GET, "videos")
            .query(&[
                ("part", "snippet,contentDetails,statistics"),
                ("id", video_id),
            ])
            .send()
            .await?;
        let list: ListResponse<Video> = Self::parse_response(response, &target).await?;
        Ok(list.items)
    }

    async fn list_comment_threads(
        &self,
        query: &CommentThreadQuery,
    ) -> Result<ListResponse<CommentThread>, YouTubeError> {
        let target = Target {
            resource: "video",
            id: &query.video_id,
        };
        let max_results = query.max_results.to_string();
        let mut params = vec![
            ("part", "snippet,replies"),
            ("videoId", query.video_id.as_str()),
            ("maxResults", max_results.as_str()),
            ("textFormat", "plainText"),
            ("order", "time"),
        ];
        if let Some(token) = &query.page_token {
            params.push(("pageToken", token.as_str()));
        }

        let response = self
            .request(reqwest::Method::GET, "commentThreads")
            .query(&params)
            .send()
            .await?;
        Self::parse_response(response, &target).await
    }

    async fn get_comment_thread(
        &self,
        thread_id: &str,
    ) -> Result<Option<CommentThread>, YouTubeError> {
        let target = Target {
            resource: "comment thread",
            id: thread_id,
        };
        let response = self
            .request(reqwest::Method::GET, "commentThreads")
            .query(&[("part", "snippet"), ("id", thread_id)])
            .send()
            .await?;
        let list: ListResponse<CommentThread> = Self::parse_response(response, &target).await?;
        Ok(list.items.into_iter().next())
    }

    async fn get_comment(&self, comment_id: &str) -> Result<Option<Comment>, YouTubeError> {
        let target = Target {
            resource: "comment",
            id: comment_id,
        };
        let response = self
            .request(reqwest::Method::GET, "comments")
            .query(&[("part", "snippet"), ("id", comment_id)])
            .send()
            .await?;
        let list: ListResponse<Comment> = Self::parse_response(response, &target).await?;
        Ok(list.items.into_iter().next())
    }

    async fn list_my_channels(&self) -> Result<Vec<Channel>, YouTubeError> {
        let target = Target {
            resource: "channel",
            id: "mine",
        };
        let response = self
            .request(reqwest::Method::GET, "channels")
            .query(&[("part", "id,snippet"), ("mine", "true")])
            .send()
            .await?;
        let list: ListResponse<Channel> = Self::parse_response(response, &target).await?;
        Ok(list.items)
    }

    async fn delete_comment(&self, comment_id: &str) -> Result<(), YouTubeError> {
        let target = Target {
            resource: "comment",
            id: comment_id,
        };
        let response = self
            .request(reqwest::Method::DELETE, "comments")
            .query(&[("id", comment_id)])
            .send()
            .await?;
        Self::check_status(response, &target).await
    }

    async fn set_moderation_status(
        &self,
        comment_id: &str,
        status: ModerationStatus,
    ) -> Result<(), YouTubeError> {
        let target = Target {
            resource: "comment",
            id: comment_id,
        };
        let response = self
            .request(reqwest::Method::POST, "comments/setModerationStatus")
            .query(&[("id", comment_id), ("moderationStatus", status.as_str())])
            .header(reqwest::header::CONTENT_LENGTH, 0)
            .send()
            .await?;
        Self::check_status(response, &target).await
    }
}
