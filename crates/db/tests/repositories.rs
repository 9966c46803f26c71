//! Integration tests for the repository layer.
//!
//! These run against a real PostgreSQL instance and are ignored by default:
//! `DATABASE_URL=postgres://... cargo test -p judiguard-db -- --ignored`

use chrono::{Duration, Utc};
use judiguard_core::status::{AnalysisStatus, Classification};
use judiguard_db::models::analyzed_comment::{CommentDeletionOutcome, CreateAnalyzedComment};
use judiguard_db::models::user::CreateUser;
use judiguard_db::repositories::{
    AnalyzedCommentRepo, PasswordResetRepo, UserRepo, VideoAnalysisRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_user(username: &str) -> CreateUser {
    CreateUser {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password_hash: "$argon2id$placeholder".to_string(),
        otp_code_hash: "digest".to_string(),
        otp_expires_at: Utc::now() + Duration::minutes(10),
    }
}

fn new_comment(analysis_id: i64, user_id: i64, comment_id: &str) -> CreateAnalyzedComment {
    CreateAnalyzedComment {
        video_analysis_id: analysis_id,
        user_id,
        youtube_video_id: "dQw4w9WgXcQ".to_string(),
        youtube_comment_id: comment_id.to_string(),
        parent_youtube_comment_id: None,
        text_original: "slot gacor hari ini".to_string(),
        text_display: "slot gacor hari ini".to_string(),
        author_display_name: Some("spammer".to_string()),
        author_channel_id: Some("UCspam".to_string()),
        author_profile_image_url: None,
        like_count: 0,
        published_at: Some(Utc::now()),
        comment_updated_at: None,
        classification: Classification::Judi,
        confidence_score: 0.97,
        model_version: "distilbert-flask-v1".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn duplicate_comment_insert_is_a_no_op(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("alice")).await.unwrap();
    let analysis = VideoAnalysisRepo::create(&pool, user.id, "dQw4w9WgXcQ")
        .await
        .unwrap();
    assert_eq!(analysis.status(), AnalysisStatus::Processing);

    let first = AnalyzedCommentRepo::insert_if_absent(&pool, &new_comment(analysis.id, user.id, "UgOne"))
        .await
        .unwrap();
    let second = AnalyzedCommentRepo::insert_if_absent(&pool, &new_comment(analysis.id, user.id, "UgOne"))
        .await
        .unwrap();

    assert!(first.is_some());
    assert!(second.is_none());

    let existing = AnalyzedCommentRepo::existing_comment_ids(
        &pool,
        &["UgOne".to_string(), "UgTwo".to_string()],
    )
    .await
    .unwrap();
    assert_eq!(existing, vec!["UgOne".to_string()]);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn analyses_are_scoped_to_their_owner(pool: PgPool) {
    let alice = UserRepo::create(&pool, &new_user("alice")).await.unwrap();
    let bob = UserRepo::create(&pool, &new_user("bobby")).await.unwrap();
    let analysis = VideoAnalysisRepo::create(&pool, alice.id, "dQw4w9WgXcQ")
        .await
        .unwrap();

    let as_bob = VideoAnalysisRepo::find_for_user(&pool, analysis.id, bob.id)
        .await
        .unwrap();
    assert!(as_bob.is_none());

    let as_alice = VideoAnalysisRepo::find_for_user(&pool, analysis.id, alice.id)
        .await
        .unwrap();
    assert!(as_alice.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn batch_deletion_can_only_begin_once(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("carol")).await.unwrap();
    let analysis = VideoAnalysisRepo::create(&pool, user.id, "dQw4w9WgXcQ")
        .await
        .unwrap();

    // Still processing.
    assert!(!VideoAnalysisRepo::begin_batch_deletion(&pool, analysis.id, Utc::now())
        .await
        .unwrap());

    VideoAnalysisRepo::mark_completed(&pool, analysis.id, 0)
        .await
        .unwrap();
    assert!(VideoAnalysisRepo::begin_batch_deletion(&pool, analysis.id, Utc::now())
        .await
        .unwrap());
    assert!(!VideoAnalysisRepo::begin_batch_deletion(&pool, analysis.id, Utc::now())
        .await
        .unwrap());

    let row = VideoAnalysisRepo::find_for_user(&pool, analysis.id, user.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status(), AnalysisStatus::DeletingClassifiedComments);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn deletion_outcome_and_stats(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("carol")).await.unwrap();
    let analysis = VideoAnalysisRepo::create(&pool, user.id, "dQw4w9WgXcQ")
        .await
        .unwrap();
    let comment = AnalyzedCommentRepo::insert_if_absent(&pool, &new_comment(analysis.id, user.id, "UgSpam"))
        .await
        .unwrap()
        .unwrap();

    let outcome = CommentDeletionOutcome {
        is_deleted_on_youtube: true,
        deletion_error: None,
        moderation_status: None,
        attempted_at: Utc::now(),
    };
    let updated = AnalyzedCommentRepo::record_deletion_outcome(&pool, comment.id, &outcome)
        .await
        .unwrap()
        .unwrap();
    assert!(updated.is_deleted_on_youtube);

    let stats = AnalyzedCommentRepo::stats_for_analysis(&pool, analysis.id)
        .await
        .unwrap();
    assert_eq!(stats.judi, 1);
    assert_eq!(stats.deleted_on_youtube, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn youtube_tokens_keep_previous_refresh_token(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("dave1")).await.unwrap();

    UserRepo::store_youtube_tokens(&pool, user.id, "access-1", Some("refresh-1"), None)
        .await
        .unwrap();
    UserRepo::store_youtube_tokens(&pool, user.id, "access-2", None, None)
        .await
        .unwrap();

    let tokens = UserRepo::get_youtube_tokens(&pool, user.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tokens.youtube_access_token.as_deref(), Some("access-2"));
    assert_eq!(tokens.youtube_refresh_token.as_deref(), Some("refresh-1"));

    UserRepo::clear_youtube_tokens(&pool, user.id).await.unwrap();
    let tokens = UserRepo::get_youtube_tokens(&pool, user.id)
        .await
        .unwrap()
        .unwrap();
    assert!(tokens.youtube_access_token.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn reset_tokens_are_replaced_and_swept(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("erin1")).await.unwrap();
    let past = Utc::now() - Duration::minutes(1);

    PasswordResetRepo::replace_for_user(&pool, user.id, "hash-a", past)
        .await
        .unwrap();
    PasswordResetRepo::replace_for_user(&pool, user.id, "hash-b", past)
        .await
        .unwrap();

    assert!(PasswordResetRepo::find_by_token_hash(&pool, "hash-a")
        .await
        .unwrap()
        .is_none());

    let swept = PasswordResetRepo::delete_expired(&pool, Utc::now())
        .await
        .unwrap();
    assert_eq!(swept, 1);
}
