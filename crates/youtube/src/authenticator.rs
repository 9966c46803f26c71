//! Per-user access tokens with transparent, single-flight refresh.

use std::sync::Arc;

use chrono::Utc;
use judiguard_core::singleflight::SingleFlight;
use judiguard_core::types::DbId;
use judiguard_db::models::user::YouTubeTokens;

use crate::credentials::CredentialStore;
use crate::error::YouTubeError;
use crate::oauth::TokenRefresher;

/// Refresh when the stored token expires within this window.
pub const DEFAULT_REFRESH_MARGIN_MINS: i64 = 5;

/// Outcome shared between every caller joined on one refresh.
#[derive(Debug, Clone)]
enum RefreshFailure {
    Unauthorized(String),
    Storage(String),
}

impl From<RefreshFailure> for YouTubeError {
    fn from(failure: RefreshFailure) -> Self {
        match failure {
            RefreshFailure::Unauthorized(msg) => YouTubeError::Unauthorized(msg),
            RefreshFailure::Storage(msg) => YouTubeError::Storage(msg),
        }
    }
}

/// Hands out valid access tokens for users with a linked YouTube account.
///
/// Concurrent callers for the same user share a single refresh.
pub struct YouTubeAuthenticator {
    store: Arc<dyn CredentialStore>,
    refresher: Arc<dyn TokenRefresher>,
    refreshes: SingleFlight<DbId, Result<String, RefreshFailure>>,
    refresh_margin: chrono::Duration,
}

impl YouTubeAuthenticator {
    pub fn new(store: Arc<dyn CredentialStore>, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self {
            store,
            refresher,
            refreshes: SingleFlight::new(),
            refresh_margin: chrono::Duration::minutes(DEFAULT_REFRESH_MARGIN_MINS),
        }
    }

    pub fn with_refresh_margin(mut self, margin: chrono::Duration) -> Self {
        self.refresh_margin = margin;
        self
    }

    /// A usable access token for `user_id`, refreshing it first if needed.
    ///
    /// Fails with [`YouTubeError::Unauthorized`] when no account is linked or
    /// the refresh is impossible or rejected. In the latter two cases all
    /// stored tokens are cleared first.
    pub async fn access_token(&self, user_id: DbId) -> Result<String, YouTubeError> {
        let tokens = self.store.load_tokens(user_id).await?.ok_or_else(|| {
            YouTubeError::Unauthorized("YouTube account is not connected".to_string())
        })?;
        let stale = needs_refresh(&tokens, self.refresh_margin);

        let access_token = tokens
            .youtube_access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                YouTubeError::Unauthorized("YouTube account is not connected".to_string())
            })?;

        if !stale {
            return Ok(access_token);
        }

        let Some(refresh_token) = tokens.youtube_refresh_token.filter(|t| !t.is_empty()) else {
            tracing::warn!(user_id, "YouTube token expired and no refresh token is stored");
            self.store.clear_tokens(user_id).await?;
            return Err(YouTubeError::Unauthorized(
                "YouTube session expired. Please reconnect your account.".to_string(),
            ));
        };

        let store = Arc::clone(&self.store);
        let refresher = Arc::clone(&self.refresher);
        let margin = self.refresh_margin;
        self.refreshes
            .run(user_id, move || refresh(store, refresher, user_id, refresh_token, margin))
            .await
            .map_err(YouTubeError::from)
    }

    /// Number of refreshes currently in flight.
    pub fn refreshes_in_flight(&self) -> usize {
        self.refreshes.in_flight_count()
    }
}

fn needs_refresh(tokens: &YouTubeTokens, margin: chrono::Duration) -> bool {
    tokens
        .youtube_token_expiry
        .is_some_and(|expiry| expiry - margin <= Utc::now())
}

async fn refresh(
    store: Arc<dyn CredentialStore>,
    refresher: Arc<dyn TokenRefresher>,
    user_id: DbId,
    mut refresh_token: String,
    margin: chrono::Duration,
) -> Result<String, RefreshFailure> {
    // The caller's snapshot may predate a refresh that has since settled.
    let current = store
        .load_tokens(user_id)
        .await
        .map_err(|e| RefreshFailure::Storage(e.to_string()))?;
    if let Some(current) = current {
        let access_token = current.youtube_access_token.as_deref().unwrap_or_default();
        if !access_token.is_empty() && !needs_refresh(&current, margin) {
            tracing::debug!(user_id, "YouTube access token already refreshed");
            return Ok(access_token.to_string());
        }
        if let Some(stored) = current.youtube_refresh_token.filter(|t| !t.is_empty()) {
            refresh_token = stored;
        }
    }

    tracing::debug!(user_id, "Refreshing YouTube access token");

    match refresher.refresh(&refresh_token).await {
        Ok(grant) => {
            store
                .save_tokens(user_id, &grant)
                .await
                .map_err(|e| RefreshFailure::Storage(e.to_string()))?;
            tracing::info!(user_id, "YouTube access token refreshed");
            Ok(grant.access_token)
        }
        Err(e) => {
            tracing::warn!(user_id, error = %e, "YouTube token refresh failed, clearing credentials");
            if let Err(clear_err) = store.clear_tokens(user_id).await {
                tracing::error!(user_id, error = %clear_err, "Failed to clear YouTube credentials");
            }
            Err(RefreshFailure::Unauthorized(
                "YouTube session expired. Please reconnect your account.".to_string(),
            ))
        }
    }
}
