//! Handlers for the signed-in user's own profile.

use axum::extract::State;
use axum::Json;
use judiguard_core::error::CoreError;
use judiguard_db::models::user::{PublicProfile, UpdateUser};
use judiguard_db::repositories::UserRepo;
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

const MODIFIABLE_FIELDS: &[&str] = &["username"];

/// GET /api/v1/users/me
pub async fn get_me(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<PublicProfile>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("user", auth.user_id))?;
    Ok(Json(DataResponse::new(user.to_public_profile())))
}

/// PATCH /api/v1/users/me
///
/// Only `username` may change. Any other field in the body is rejected.
pub async fn update_me(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<Map<String, Value>>,
) -> AppResult<Json<DataResponse<PublicProfile>>> {
    let update = parse_profile_update(&body)?;

    if let Some(username) = &update.username {
        if let Some(other) = UserRepo::find_by_username(&state.pool, username).await? {
            if other.id != auth.user_id {
                return Err(AppError::Core(CoreError::Conflict(
                    "Username is already taken".into(),
                )));
            }
        }
    }

    let user = UserRepo::update(&state.pool, auth.user_id, &update)
        .await?
        .ok_or_else(|| CoreError::not_found("user", auth.user_id))?;

    tracing::info!(user_id = user.id, "Profile updated");
    Ok(Json(DataResponse::new(user.to_public_profile())))
}

/// DELETE /api/v1/users/me
///
/// Soft-deactivates the account. Outstanding tokens stop working.
pub async fn deactivate_me(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<MessageResponse>>> {
    UserRepo::deactivate(&state.pool, auth.user_id).await?;
    tracing::info!(user_id = auth.user_id, "Account deactivated");
    Ok(Json(MessageResponse::new("Account has been deactivated.")))
}

fn parse_profile_update(body: &Map<String, Value>) -> Result<UpdateUser, AppError> {
    if let Some(field) = body
        .keys()
        .find(|key| !MODIFIABLE_FIELDS.contains(&key.as_str()))
    {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Field '{field}' cannot be modified through this route"
        ))));
    }

    let username = match body.get("username") {
        None => {
            return Err(AppError::Core(CoreError::Validation(
                "No updatable fields were provided".into(),
            )))
        }
        Some(Value::String(name)) => name.trim().to_string(),
        Some(_) => {
            return Err(AppError::Core(CoreError::Validation(
                "Username must be a string".into(),
            )))
        }
    };

    let length = username.chars().count();
    if !(3..=50).contains(&length) {
        return Err(AppError::Core(CoreError::Validation(
            "Username must be between 3 and 50 characters".into(),
        )));
    }

    Ok(UpdateUser {
        username: Some(username),
    })
}
