//! Handlers for linking a YouTube channel through Google OAuth.

use axum::extract::{Query, State};
use axum::response::Redirect;
use axum::Json;
use judiguard_core::error::CoreError;
use judiguard_core::types::DbId;
use judiguard_db::models::user::PublicProfile;
use judiguard_db::repositories::UserRepo;
use judiguard_youtube::http::HttpYouTubeApi;
use judiguard_youtube::YouTubeApi;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{generate_oauth_state, validate_oauth_state};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    /// Google consent screen to send the browser to.
    pub auth_url: String,
}

/// Query string Google appends to the redirect URI.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/auth/youtube/connect
pub async fn connect(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<ConnectResponse>>> {
    let oauth_state = generate_oauth_state(auth.user_id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("OAuth state generation error: {e}")))?;
    let url = state.google.authorize_url(&oauth_state)?;

    Ok(Json(DataResponse::new(ConnectResponse {
        auth_url: url.to_string(),
    })))
}

/// GET /api/v1/auth/youtube/callback
///
/// Always redirects back to the web client's profile page, reporting the
/// outcome in the `youtube` query parameter.
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Redirect {
    let frontend_url = &state.config.frontend_url;
    match complete_connection(&state, params).await {
        Ok(user_id) => {
            tracing::info!(user_id, "YouTube account connected");
            Redirect::to(&profile_redirect(frontend_url, None))
        }
        Err(e) => {
            tracing::warn!(error = %e, "YouTube connection failed");
            Redirect::to(&profile_redirect(frontend_url, Some(&e.to_string())))
        }
    }
}

/// POST /api/v1/auth/youtube/disconnect
pub async fn disconnect(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<PublicProfile>>> {
    UserRepo::disconnect_youtube(&state.pool, auth.user_id).await?;
    tracing::info!(user_id = auth.user_id, "YouTube account disconnected");

    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("user", auth.user_id))?;
    Ok(Json(DataResponse::new(user.to_public_profile())))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn complete_connection(state: &AppState, params: CallbackParams) -> AppResult<DbId> {
    if let Some(error) = params.error {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Google consent was not granted: {error}"
        ))));
    }
    let (Some(code), Some(oauth_state)) = (params.code, params.state) else {
        return Err(AppError::BadRequest(
            "Missing code or state in OAuth callback".into(),
        ));
    };

    let user_id = validate_oauth_state(&oauth_state, &state.config.jwt).map_err(|_| {
        AppError::Core(CoreError::Unauthorized(
            "Invalid or expired OAuth state".into(),
        ))
    })?;

    let grant = state.google.exchange_code(&code).await?;
    UserRepo::store_youtube_tokens(
        &state.pool,
        user_id,
        &grant.access_token,
        grant.refresh_token.as_deref(),
        grant.expires_at,
    )
    .await?;

    record_channel(state, user_id, &grant.access_token).await;
    Ok(user_id)
}

/// Best effort: a missing channel name does not undo the connection.
async fn record_channel(state: &AppState, user_id: DbId, access_token: &str) {
    let api = HttpYouTubeApi::with_access_token(
        state.http.clone(),
        state.config.youtube.api_base_url.clone(),
        access_token,
    );

    let channel = match api.list_my_channels().await {
        Ok(channels) => channels.into_iter().next(),
        Err(e) => {
            tracing::warn!(user_id, error = %e, "Could not fetch YouTube channel");
            return;
        }
    };
    let Some(channel) = channel else {
        tracing::warn!(user_id, "Google account has no YouTube channel");
        return;
    };

    let title = channel.snippet.and_then(|s| s.title);
    if let Err(e) =
        UserRepo::set_youtube_channel(&state.pool, user_id, Some(&channel.id), title.as_deref())
            .await
    {
        tracing::warn!(user_id, error = %e, "Could not store YouTube channel");
    }
}

fn profile_redirect(frontend_url: &str, error: Option<&str>) -> String {
    let params: Vec<(&str, &str)> = match error {
        None => vec![("youtube", "connected")],
        Some(message) => vec![("youtube", "error"), ("message", message)],
    };
    Url::parse_with_params(&format!("{frontend_url}/profile"), &params)
        .map(String::from)
        .unwrap_or_else(|_| "/".to_string())
}
