//! Handlers for the `/auth` resource: local accounts, Google Sign-In, and
//! password recovery.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use judiguard_core::error::CoreError;
use judiguard_core::one_time_codes::{
    generate_otp, generate_reset_token, hash_secret, secret_matches, OTP_TTL_MINS,
    RESET_TOKEN_TTL_MINS,
};
use judiguard_core::types::DbId;
use judiguard_db::models::user::{CreateGoogleUser, CreateUser, PublicProfile, User};
use judiguard_db::repositories::{PasswordResetRepo, UserRepo};
use judiguard_youtube::google_identity::{verify_id_token, GoogleIdentity};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

const USERNAME_MAX_LENGTH: usize = 50;

const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account with that email exists, a password reset link has been sent.";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(
        min = 3,
        max = 50,
        message = "Username must be between 3 and 50 characters"
    ))]
    pub username: String,
    #[validate(email(message = "Email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

/// Request body for `POST /auth/verify-otp`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp_code: String,
}

/// Request body for `POST /auth/resend-otp` and `POST /auth/forgot-password`.
#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/google/signin`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleSignInRequest {
    pub id_token: String,
}

/// Request body for `PUT /auth/reset-password/{token}`.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: String,
}

/// Request body for `PUT /auth/change-password`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    /// Required when the account already has a password.
    pub current_password: Option<String>,
    pub new_password: String,
}

/// Response for a newly registered, not yet verified account.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: PublicProfile,
}

/// Successful authentication response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: PublicProfile,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create a local account and email it a verification code.
pub async fn register(
    State(state): State<AppState>,
    Json(mut input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<RegisterResponse>>)> {
    input.username = input.username.trim().to_string();
    input.email = normalize_email(&input.email);
    input.validate()?;

    if let Some(existing) = UserRepo::find_by_email(&state.pool, &input.email).await? {
        let message = if existing.is_verified {
            "Email is already registered"
        } else {
            "Email is already registered but not verified. Request a new verification code."
        };
        return Err(AppError::Core(CoreError::Conflict(message.into())));
    }
    if UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "Username is already taken".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    let otp = generate_otp();

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: input.username,
            email: input.email,
            password_hash,
            otp_code_hash: otp.hash,
            otp_expires_at: Utc::now() + chrono::Duration::minutes(OTP_TTL_MINS),
        },
    )
    .await?;
    tracing::info!(user_id = user.id, "User registered");

    send_verification_code(&state, &user, &otp.plaintext).await;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(RegisterResponse {
            message: "Registration successful. Check your email for the verification code."
                .into(),
            user: user.to_public_profile(),
        })),
    ))
}

/// POST /api/v1/auth/verify-otp
///
/// Confirm the emailed code. Signs the user in on success.
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(input): Json<VerifyOtpRequest>,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    let invalid =
        || AppError::Core(CoreError::Validation("Invalid or expired verification code".into()));

    let user = UserRepo::find_by_email(&state.pool, &normalize_email(&input.email))
        .await?
        .ok_or_else(invalid)?;

    if user.is_verified {
        return Err(AppError::Core(CoreError::Validation(
            "Account is already verified".into(),
        )));
    }

    let code_is_valid = match (&user.otp_code_hash, user.otp_expires_at) {
        (Some(hash), Some(expires_at)) => {
            expires_at > Utc::now() && secret_matches(&input.otp_code, hash)
        }
        _ => false,
    };
    if !code_is_valid {
        return Err(invalid());
    }

    UserRepo::mark_verified(&state.pool, user.id).await?;
    tracing::info!(user_id = user.id, "Email verified");

    let user = reload_user(&state, user.id).await?;
    Ok(Json(DataResponse::new(auth_response(&state, &user)?)))
}

/// POST /api/v1/auth/resend-otp
///
/// Replace the pending verification code and email the new one.
pub async fn resend_otp(
    State(state): State<AppState>,
    Json(input): Json<EmailRequest>,
) -> AppResult<Json<DataResponse<MessageResponse>>> {
    let user = UserRepo::find_by_email(&state.pool, &normalize_email(&input.email))
        .await?
        .ok_or_else(|| CoreError::not_found("user", &input.email))?;

    if user.is_verified {
        return Err(AppError::Core(CoreError::Validation(
            "Account is already verified".into(),
        )));
    }

    let otp = generate_otp();
    UserRepo::set_otp(
        &state.pool,
        user.id,
        &otp.hash,
        Utc::now() + chrono::Duration::minutes(OTP_TTL_MINS),
    )
    .await?;

    send_verification_code(&state, &user, &otp.plaintext).await;

    Ok(Json(MessageResponse::new(
        "A new verification code has been sent to your email.",
    )))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    let invalid_credentials =
        || AppError::Core(CoreError::Unauthorized("Invalid email or password".into()));

    let user = UserRepo::find_by_email(&state.pool, &normalize_email(&input.email))
        .await?
        .ok_or_else(invalid_credentials)?;

    let Some(password_hash) = &user.password_hash else {
        return Err(AppError::Core(CoreError::Unauthorized(
            "This account signs in with Google. Use Google Sign-In or reset your password.".into(),
        )));
    };

    let password_valid = verify_password(&input.password, password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(invalid_credentials());
    }

    ensure_can_sign_in(&user)?;
    if !user.is_verified {
        return Err(AppError::Core(CoreError::Forbidden(
            "Email is not verified. Check your inbox for the verification code.".into(),
        )));
    }

    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(DataResponse::new(auth_response(&state, &user)?)))
}

/// POST /api/v1/auth/google/signin
///
/// Sign in with a Google ID token. Links to an existing account with the
/// same email, or creates a verified Google-only account.
pub async fn google_sign_in(
    State(state): State<AppState>,
    Json(input): Json<GoogleSignInRequest>,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    let youtube = &state.config.youtube;
    let Some(client_id) = youtube.sign_in_client_id.as_deref() else {
        return Err(AppError::Core(CoreError::Forbidden(
            "Google Sign-In is not enabled".into(),
        )));
    };

    let identity =
        verify_id_token(&state.http, &youtube.tokeninfo_url, &input.id_token, client_id).await?;
    if !identity.email_verified {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Google account email is not verified".into(),
        )));
    }

    let user = match UserRepo::find_by_google_id(&state.pool, &identity.sub).await? {
        Some(user) => user,
        None => match UserRepo::find_by_email(&state.pool, &identity.email).await? {
            Some(existing) => {
                ensure_can_sign_in(&existing)?;
                tracing::info!(user_id = existing.id, "Linking Google identity to account");
                UserRepo::link_google_id(&state.pool, existing.id, &identity.sub)
                    .await?
                    .ok_or_else(|| CoreError::not_found("user", existing.id))?
            }
            None => create_google_user(&state, &identity).await?,
        },
    };

    ensure_can_sign_in(&user)?;
    tracing::info!(user_id = user.id, "User signed in with Google");
    Ok(Json(DataResponse::new(auth_response(&state, &user)?)))
}

/// POST /api/v1/auth/forgot-password
///
/// Email a single-use reset link. The response never reveals whether the
/// email belongs to an account.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(input): Json<EmailRequest>,
) -> AppResult<Json<DataResponse<MessageResponse>>> {
    let email = normalize_email(&input.email);

    match UserRepo::find_by_email(&state.pool, &email).await? {
        Some(user) if user.is_active => {
            let token = generate_reset_token();
            PasswordResetRepo::replace_for_user(
                &state.pool,
                user.id,
                &token.hash,
                Utc::now() + chrono::Duration::minutes(RESET_TOKEN_TTL_MINS),
            )
            .await?;

            let link = format!(
                "{}/reset-password/{}",
                state.config.frontend_url, token.plaintext
            );
            if let Err(e) = state
                .mailer
                .send_password_reset(&user.email, &user.username, &link)
                .await
            {
                tracing::error!(user_id = user.id, error = %e, "Failed to send password reset email");
            }
        }
        _ => tracing::debug!("Password reset requested for unknown or inactive email"),
    }

    Ok(Json(MessageResponse::new(FORGOT_PASSWORD_MESSAGE)))
}

/// PUT /api/v1/auth/reset-password/{token}
///
/// Consume a reset token and set a new password.
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<Json<DataResponse<MessageResponse>>> {
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let invalid =
        || AppError::Core(CoreError::Validation("Invalid or expired reset token".into()));

    let reset = PasswordResetRepo::find_by_token_hash(&state.pool, &hash_secret(&token))
        .await?
        .ok_or_else(invalid)?;

    if reset.is_expired(Utc::now()) {
        PasswordResetRepo::delete(&state.pool, reset.id).await?;
        return Err(invalid());
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(&state.pool, reset.user_id, &password_hash).await?;
    PasswordResetRepo::delete(&state.pool, reset.id).await?;

    tracing::info!(user_id = reset.user_id, "Password reset");
    Ok(Json(MessageResponse::new(
        "Password has been reset. You can now log in.",
    )))
}

/// PUT /api/v1/auth/change-password
///
/// Change the signed-in user's password. Google-only accounts may set a
/// first password without supplying a current one.
pub async fn change_password(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<Json<DataResponse<MessageResponse>>> {
    let user = reload_user(&state, auth.user_id).await?;

    if let Some(existing_hash) = &user.password_hash {
        let current = input.current_password.as_deref().unwrap_or_default();
        let matches = verify_password(current, existing_hash)
            .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
        if !matches {
            return Err(AppError::Core(CoreError::Validation(
                "Current password is incorrect".into(),
            )));
        }
    }

    validate_password_strength(&input.new_password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let password_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(&state.pool, user.id, &password_hash).await?;

    tracing::info!(user_id = user.id, "Password changed");
    Ok(Json(MessageResponse::new("Password changed successfully.")))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn ensure_can_sign_in(user: &User) -> AppResult<()> {
    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }
    Ok(())
}

async fn reload_user(state: &AppState, user_id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("user", user_id)))
}

fn auth_response(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let access_token = generate_access_token(user.id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(AuthResponse {
        access_token,
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        user: user.to_public_profile(),
    })
}

/// Email failures are logged; the user can ask for a new code.
async fn send_verification_code(state: &AppState, user: &User, code: &str) {
    if let Err(e) = state
        .mailer
        .send_verification_code(&user.email, &user.username, code)
        .await
    {
        tracing::error!(user_id = user.id, error = %e, "Failed to send verification email");
    }
}

async fn create_google_user(state: &AppState, identity: &GoogleIdentity) -> AppResult<User> {
    let base = username_base(identity);
    let username = match UserRepo::find_by_username(&state.pool, &base).await? {
        None => base,
        Some(_) => {
            let suffix = Uuid::new_v4().simple().to_string();
            format!("{base}_{}", &suffix[..6])
        }
    };

    let user = UserRepo::create_google(
        &state.pool,
        &CreateGoogleUser {
            username,
            email: identity.email.clone(),
            google_id: identity.sub.clone(),
        },
    )
    .await?;
    tracing::info!(user_id = user.id, "User created from Google identity");
    Ok(user)
}

/// Username derived from the Google display name, or the email's local part.
fn username_base(identity: &GoogleIdentity) -> String {
    let source = identity
        .name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| identity.email.split('@').next().unwrap_or_default());

    let mut base: String = source
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '.')
        .take(USERNAME_MAX_LENGTH - 7)
        .collect();

    if base.chars().count() < 3 {
        base = format!("user{base}");
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(name: Option<&str>, email: &str) -> GoogleIdentity {
        GoogleIdentity {
            sub: "1234567890".into(),
            email: email.into(),
            email_verified: true,
            name: name.map(str::to_string),
        }
    }

    #[test]
    fn username_comes_from_display_name() {
        assert_eq!(
            username_base(&identity(Some("Budi Santoso"), "budi@example.com")),
            "Budi_Santoso"
        );
    }

    #[test]
    fn username_falls_back_to_email_local_part() {
        assert_eq!(
            username_base(&identity(None, "siti.rahma@example.com")),
            "siti.rahma"
        );
        assert_eq!(
            username_base(&identity(Some("   "), "ani@example.com")),
            "ani"
        );
    }

    #[test]
    fn short_or_symbolic_names_are_padded() {
        assert_eq!(username_base(&identity(Some("李"), "x@example.com")), "user");
        assert_eq!(username_base(&identity(None, "jo@example.com")), "userjo");
    }

    #[test]
    fn long_names_leave_room_for_a_suffix() {
        let long = "a".repeat(80);
        let base = username_base(&identity(Some(&long), "a@example.com"));
        assert_eq!(base.len(), USERNAME_MAX_LENGTH - 7);
    }

    #[test]
    fn register_request_validation() {
        let ok = RegisterRequest {
            username: "budi".into(),
            email: "budi@example.com".into(),
            password: "secret1".into(),
        };
        assert!(ok.validate().is_ok());

        let bad = RegisterRequest {
            username: "bu".into(),
            email: "not-an-email".into(),
            password: "123".into(),
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Budi@Example.COM "), "budi@example.com");
    }
}
