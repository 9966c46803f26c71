//! End-to-end account flows against a real database.
//!
//! Ignored by default:
//! `DATABASE_URL=postgres://... cargo test -p judiguard-api -- --ignored`

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{assert_error, body_json, build_test_app_with_pool, get_auth, json_auth, post_json};
use judiguard_core::one_time_codes::hash_secret;
use judiguard_db::repositories::UserRepo;
use serde_json::json;
use sqlx::PgPool;

const KNOWN_CODE: &str = "424242";

/// Register `budi` and replace the emailed code with a known one.
async fn register_budi(pool: &PgPool) -> i64 {
    let response = post_json(
        build_test_app_with_pool(pool.clone()),
        "/api/v1/auth/register",
        json!({ "username": "budi", "email": "Budi@Example.com", "password": "rahasia1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["user"]["email"], "budi@example.com");
    assert_eq!(json["data"]["user"]["is_verified"], false);

    let user_id = json["data"]["user"]["id"].as_i64().unwrap();
    UserRepo::set_otp(
        pool,
        user_id,
        &hash_secret(KNOWN_CODE),
        Utc::now() + Duration::minutes(10),
    )
    .await
    .unwrap();
    user_id
}

async fn login(pool: &PgPool, password: &str) -> axum::http::Response<axum::body::Body> {
    post_json(
        build_test_app_with_pool(pool.clone()),
        "/api/v1/auth/login",
        json!({ "email": "budi@example.com", "password": password }),
    )
    .await
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn register_verify_login_and_profile(pool: PgPool) {
    register_budi(&pool).await;

    // Unverified accounts cannot log in.
    assert_error(login(&pool, "rahasia1").await, StatusCode::FORBIDDEN, "FORBIDDEN").await;

    let response = post_json(
        build_test_app_with_pool(pool.clone()),
        "/api/v1/auth/verify-otp",
        json!({ "email": "budi@example.com", "otpCode": "000000" }),
    )
    .await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;

    let response = post_json(
        build_test_app_with_pool(pool.clone()),
        "/api/v1/auth/verify-otp",
        json!({ "email": "budi@example.com", "otpCode": KNOWN_CODE }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_error(
        login(&pool, "wrong-password").await,
        StatusCode::UNAUTHORIZED,
        "UNAUTHORIZED",
    )
    .await;

    let response = login(&pool, "rahasia1").await;
    assert_eq!(response.status(), StatusCode::OK);
    let token = body_json(response).await["data"]["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let app = build_test_app_with_pool(pool.clone());
    let response = get_auth(app, "/api/v1/users/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let profile = body_json(response).await;
    assert_eq!(profile["data"]["username"], "budi");
    assert_eq!(profile["data"]["is_youtube_connected"], false);
    assert!(profile["data"].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn duplicate_email_conflicts(pool: PgPool) {
    register_budi(&pool).await;

    let response = post_json(
        build_test_app_with_pool(pool.clone()),
        "/api/v1/auth/register",
        json!({ "username": "budi2", "email": "budi@example.com", "password": "rahasia1" }),
    )
    .await;
    assert_error(response, StatusCode::CONFLICT, "CONFLICT").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn profile_updates_reject_forbidden_fields_and_deactivation_revokes_access(pool: PgPool) {
    let user_id = register_budi(&pool).await;
    UserRepo::mark_verified(&pool, user_id).await.unwrap();
    let token = body_json(login(&pool, "rahasia1").await).await["data"]["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = json_auth(
        build_test_app_with_pool(pool.clone()),
        "PATCH",
        "/api/v1/users/me",
        &token,
        json!({ "email": "evil@example.com" }),
    )
    .await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;

    let response = json_auth(
        build_test_app_with_pool(pool.clone()),
        "PATCH",
        "/api/v1/users/me",
        &token,
        json!({ "username": "budi_baru" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["username"], "budi_baru");

    let response = json_auth(
        build_test_app_with_pool(pool.clone()),
        "DELETE",
        "/api/v1/users/me",
        &token,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = build_test_app_with_pool(pool.clone());
    let response = get_auth(app, "/api/v1/users/me", &token).await;
    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
    assert_error(login(&pool, "rahasia1").await, StatusCode::FORBIDDEN, "FORBIDDEN").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn forgot_password_does_not_reveal_accounts(pool: PgPool) {
    register_budi(&pool).await;

    let known = body_json(
        post_json(
            build_test_app_with_pool(pool.clone()),
            "/api/v1/auth/forgot-password",
            json!({ "email": "budi@example.com" }),
        )
        .await,
    )
    .await;
    let unknown = body_json(
        post_json(
            build_test_app_with_pool(pool.clone()),
            "/api/v1/auth/forgot-password",
            json!({ "email": "nobody@example.com" }),
        )
        .await,
    )
    .await;
    assert_eq!(known, unknown);
}
