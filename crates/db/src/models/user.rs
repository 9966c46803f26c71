//! User entity model and DTOs.

use judiguard_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash, OTP digest and YouTube OAuth tokens -- NEVER
/// serialize this to API responses directly. Use [`User::to_public_profile`].
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub is_verified: bool,
    pub otp_code_hash: Option<String>,
    pub otp_expires_at: Option<Timestamp>,
    pub youtube_access_token: Option<String>,
    pub youtube_refresh_token: Option<String>,
    pub youtube_token_expiry: Option<Timestamp>,
    pub youtube_channel_id: Option<String>,
    pub youtube_channel_name: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Whether a YouTube account is currently linked.
    pub fn is_youtube_connected(&self) -> bool {
        self.youtube_access_token.is_some()
    }

    /// Whether the account can be signed into at all.
    ///
    /// A row with neither a password nor a Google identity is inconsistent.
    pub fn has_login_method(&self) -> bool {
        self.password_hash.is_some() || self.google_id.is_some()
    }

    /// Project the row onto its client-safe representation.
    pub fn to_public_profile(&self) -> PublicProfile {
        PublicProfile {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            is_verified: self.is_verified,
            has_password: self.password_hash.is_some(),
            is_google_account: self.google_id.is_some(),
            is_youtube_connected: self.is_youtube_connected(),
            youtube_channel_id: self.youtube_channel_id.clone(),
            youtube_channel_name: self.youtube_channel_name.clone(),
            created_at: self.created_at,
        }
    }
}

/// Safe user representation for API responses.
///
/// Omits the password hash, Google id, OTP digest, and OAuth tokens.
#[derive(Debug, Clone, Serialize)]
pub struct PublicProfile {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub is_verified: bool,
    pub has_password: bool,
    pub is_google_account: bool,
    pub is_youtube_connected: bool,
    pub youtube_channel_id: Option<String>,
    pub youtube_channel_name: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for creating a local (email + password) account.
#[derive(Debug)]
pub struct CreateUser {
    pub username: String,
    /// Must already be lowercased.
    pub email: String,
    pub password_hash: String,
    pub otp_code_hash: String,
    pub otp_expires_at: Timestamp,
}

/// DTO for creating an account from a verified Google identity.
#[derive(Debug)]
pub struct CreateGoogleUser {
    pub username: String,
    pub email: String,
    pub google_id: String,
}

/// DTO for self-service profile updates.
#[derive(Debug, Deserialize)]
pub struct UpdateUser {
    pub username: Option<String>,
}

/// Stored YouTube OAuth credentials for one user.
#[derive(Debug, Clone, FromRow)]
pub struct YouTubeTokens {
    pub youtube_access_token: Option<String>,
    pub youtube_refresh_token: Option<String>,
    pub youtube_token_expiry: Option<Timestamp>,
}
