//! Repository for the `users` table.

use judiguard_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::user::{CreateGoogleUser, CreateUser, UpdateUser, User, YouTubeTokens};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, email, password_hash, google_id, is_verified, \
                        otp_code_hash, otp_expires_at, youtube_access_token, \
                        youtube_refresh_token, youtube_token_expiry, youtube_channel_id, \
                        youtube_channel_name, is_active, created_at, updated_at";

/// Provides CRUD operations for users and their linked YouTube credentials.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new local account (unverified, with a pending OTP).
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, password_hash, otp_code_hash, otp_expires_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.otp_code_hash)
            .bind(input.otp_expires_at)
            .fetch_one(pool)
            .await
    }

    /// Insert a Google-only account. Google has already verified the email.
    pub async fn create_google(
        pool: &PgPool,
        input: &CreateGoogleUser,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, google_id, is_verified)
             VALUES ($1, $2, $3, true)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.google_id)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by username (case-sensitive).
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email. Emails are stored lowercased; the input is lowercased here.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email.trim().to_lowercase())
            .fetch_optional(pool)
            .await
    }

    /// Find a user by Google account id.
    pub async fn find_by_google_id(
        pool: &PgPool,
        google_id: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE google_id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(google_id)
            .fetch_optional(pool)
            .await
    }

    /// Update a user. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                username = COALESCE($2, username)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.username)
            .fetch_optional(pool)
            .await
    }

    /// Soft-deactivate a user by setting `is_active = false`.
    ///
    /// Returns `true` if the row was updated.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE users SET is_active = false WHERE id = $1 AND is_active = true")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Store a new pending verification code digest.
    pub async fn set_otp(
        pool: &PgPool,
        id: DbId,
        otp_code_hash: &str,
        expires_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET otp_code_hash = $2, otp_expires_at = $3 WHERE id = $1")
            .bind(id)
            .bind(otp_code_hash)
            .bind(expires_at)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Mark the email as verified and discard the pending code.
    pub async fn mark_verified(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET
                is_verified = true,
                otp_code_hash = NULL,
                otp_expires_at = NULL
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Discard verification codes that expired before `cutoff`.
    ///
    /// Returns the number of rows cleared.
    pub async fn clear_expired_otps(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET otp_code_hash = NULL, otp_expires_at = NULL
             WHERE otp_expires_at IS NOT NULL AND otp_expires_at < $1",
        )
        .bind(cutoff)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Update a user's password hash. Returns `true` if the row was updated.
    pub async fn update_password(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Attach a Google identity to an existing account and mark it verified.
    pub async fn link_google_id(
        pool: &PgPool,
        id: DbId,
        google_id: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET google_id = $2, is_verified = true
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(google_id)
            .fetch_optional(pool)
            .await
    }

    // ---- YouTube credentials ----

    /// Load the stored YouTube OAuth credentials for a user.
    pub async fn get_youtube_tokens(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<YouTubeTokens>, sqlx::Error> {
        sqlx::query_as::<_, YouTubeTokens>(
            "SELECT youtube_access_token, youtube_refresh_token, youtube_token_expiry
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Persist freshly issued YouTube tokens.
    ///
    /// A `None` refresh token keeps the one already on file, since Google
    /// only returns a refresh token on first consent.
    pub async fn store_youtube_tokens(
        pool: &PgPool,
        id: DbId,
        access_token: &str,
        refresh_token: Option<&str>,
        expiry: Option<Timestamp>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET
                youtube_access_token = $2,
                youtube_refresh_token = COALESCE($3, youtube_refresh_token),
                youtube_token_expiry = $4
             WHERE id = $1",
        )
        .bind(id)
        .bind(access_token)
        .bind(refresh_token)
        .bind(expiry)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Record the linked channel's id and title.
    pub async fn set_youtube_channel(
        pool: &PgPool,
        id: DbId,
        channel_id: Option<&str>,
        channel_name: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET youtube_channel_id = $2, youtube_channel_name = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(channel_id)
        .bind(channel_name)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Forget all stored YouTube tokens, keeping channel metadata.
    pub async fn clear_youtube_tokens(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET
                youtube_access_token = NULL,
                youtube_refresh_token = NULL,
                youtube_token_expiry = NULL
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Unlink the YouTube account entirely (tokens and channel metadata).
    pub async fn disconnect_youtube(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET
                youtube_access_token = NULL,
                youtube_refresh_token = NULL,
                youtube_token_expiry = NULL,
                youtube_channel_id = NULL,
                youtube_channel_name = NULL
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}
