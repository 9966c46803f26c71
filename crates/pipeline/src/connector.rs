//! Produces a [`YouTubeApi`] bound to a user's credentials.

use std::sync::Arc;

use async_trait::async_trait;
use judiguard_core::types::DbId;
use judiguard_youtube::http::HttpYouTubeApi;
use judiguard_youtube::{YouTubeApi, YouTubeAuthenticator, YouTubeError};

#[async_trait]
pub trait YouTubeConnector: Send + Sync {
    /// An API client acting as `user_id`. Fails `Unauthorized` if the user
    /// has no usable YouTube credentials.
    async fn connect(&self, user_id: DbId) -> Result<Arc<dyn YouTubeApi>, YouTubeError>;
}

/// Connects with the user's OAuth access token, refreshing it when needed.
pub struct OAuthConnector {
    authenticator: Arc<YouTubeAuthenticator>,
    client: reqwest::Client,
    api_base_url: String,
}

impl OAuthConnector {
    pub fn new(
        authenticator: Arc<YouTubeAuthenticator>,
        client: reqwest::Client,
        api_base_url: impl Into<String>,
    ) -> Self {
        Self {
            authenticator,
            client,
            api_base_url: api_base_url.into(),
        }
    }
}

#[async_trait]
impl YouTubeConnector for OAuthConnector {
    async fn connect(&self, user_id: DbId) -> Result<Arc<dyn YouTubeApi>, YouTubeError> {
        let token = self.authenticator.access_token(user_id).await?;
        Ok(Arc::new(HttpYouTubeApi::with_access_token(
            self.client.clone(),
            self.api_base_url.clone(),
            token,
        )))
    }
}
