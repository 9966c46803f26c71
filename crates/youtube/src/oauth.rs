//! Google OAuth2 for YouTube: consent URL, authorization-code exchange, and
//! refresh-token grants.

use async_trait::async_trait;
use chrono::Utc;
use judiguard_core::types::Timestamp;
use reqwest::{StatusCode, Url};
use serde::Deserialize;

use crate::config::{YouTubeConfig, YOUTUBE_SCOPE};
use crate::error::YouTubeError;

/// Tokens returned by a successful grant.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenGrant {
    pub access_token: String,
    /// Only present on the first consent or when Google rotates it.
    pub refresh_token: Option<String>,
    pub expires_at: Option<Timestamp>,
}

/// Exchanges a refresh token for a new access token.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, YouTubeError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

impl TokenResponse {
    fn into_grant(self) -> TokenGrant {
        TokenGrant {
            access_token: self.access_token,
            refresh_token: self.refresh_token.filter(|t| !t.is_empty()),
            expires_at: self
                .expires_in
                .map(|secs| Utc::now() + chrono::Duration::seconds(secs)),
        }
    }
}

/// Google's OAuth2 endpoints bound to the application's client credentials.
#[derive(Clone)]
pub struct GoogleOAuth {
    client: reqwest::Client,
    config: YouTubeConfig,
}

impl GoogleOAuth {
    pub fn new(client: reqwest::Client, config: YouTubeConfig) -> Self {
        Self { client, config }
    }

    /// Consent URL that asks for offline access to the YouTube scope.
    ///
    /// `state` is echoed back to the redirect URI unchanged.
    pub fn authorize_url(&self, state: &str) -> Result<Url, YouTubeError> {
        Url::parse_with_params(
            &self.config.auth_url,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", YOUTUBE_SCOPE),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("include_granted_scopes", "true"),
                ("state", state),
            ],
        )
        .map_err(|e| YouTubeError::Api {
            status: 500,
            message: format!("Invalid OAuth authorization URL: {e}"),
        })
    }

    /// Trade an authorization code from the consent redirect for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenGrant, YouTubeError> {
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ])
        .await
    }

    async fn token_request(&self, params: &[(&str, &str)]) -> Result<TokenGrant, YouTubeError> {
        let mut form: Vec<(&str, &str)> = vec![
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];
        form.extend_from_slice(params);

        let response = self
            .client
            .post(&self.config.token_url)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let body: TokenResponse = response.json().await?;
            return Ok(body.into_grant());
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_token_error(status, &body))
    }
}

#[async_trait]
impl TokenRefresher for GoogleOAuth {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, YouTubeError> {
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }
}

/// Map a failed token-endpoint response.
///
/// `invalid_grant` means the user revoked access or the refresh token
/// expired, so re-consent is the only fix.
fn classify_token_error(status: StatusCode, body: &str) -> YouTubeError {
    let parsed = serde_json::from_str::<TokenErrorResponse>(body).ok();
    match parsed {
        Some(err) if err.error == "invalid_grant" || status == StatusCode::UNAUTHORIZED => {
            YouTubeError::Unauthorized(
                err.error_description
                    .unwrap_or_else(|| "Google rejected the stored credentials".to_string()),
            )
        }
        Some(err) => YouTubeError::Api {
            status: status.as_u16(),
            message: err.error_description.unwrap_or(err.error),
        },
        None if status == StatusCode::UNAUTHORIZED => {
            YouTubeError::Unauthorized("Google rejected the stored credentials".to_string())
        }
        None => YouTubeError::Api {
            status: status.as_u16(),
            message: body.to_string(),
        },
    }
}
