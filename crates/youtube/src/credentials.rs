//! Persistence seam for a user's YouTube OAuth tokens.

use async_trait::async_trait;
use judiguard_core::types::DbId;
use judiguard_db::models::user::YouTubeTokens;
use judiguard_db::repositories::UserRepo;
use judiguard_db::DbPool;

use crate::error::YouTubeError;
use crate::oauth::TokenGrant;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Stored tokens, or `None` if the user does not exist.
    async fn load_tokens(&self, user_id: DbId) -> Result<Option<YouTubeTokens>, YouTubeError>;

    /// Persist a grant. A grant without a refresh token keeps the stored one.
    async fn save_tokens(&self, user_id: DbId, grant: &TokenGrant) -> Result<(), YouTubeError>;

    /// Forget every stored token so the user has to reconnect.
    async fn clear_tokens(&self, user_id: DbId) -> Result<(), YouTubeError>;
}

/// Tokens stored on the `users` row.
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: DbPool,
}

impl PgCredentialStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn load_tokens(&self, user_id: DbId) -> Result<Option<YouTubeTokens>, YouTubeError> {
        Ok(UserRepo::get_youtube_tokens(&self.pool, user_id).await?)
    }

    async fn save_tokens(&self, user_id: DbId, grant: &TokenGrant) -> Result<(), YouTubeError> {
        UserRepo::store_youtube_tokens(
            &self.pool,
            user_id,
            &grant.access_token,
            grant.refresh_token.as_deref(),
            grant.expires_at,
        )
        .await?;
        Ok(())
    }

    async fn clear_tokens(&self, user_id: DbId) -> Result<(), YouTubeError> {
        UserRepo::clear_youtube_tokens(&self.pool, user_id).await?;
        Ok(())
    }
}
