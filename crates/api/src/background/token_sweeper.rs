//! Periodic cleanup of expired one-time secrets.
//!
//! Deletes password reset tokens past their expiry and clears verification
//! codes that can no longer be redeemed.

use std::time::Duration;

use chrono::Utc;
use judiguard_db::repositories::{PasswordResetRepo, UserRepo};
use judiguard_db::DbPool;
use tokio_util::sync::CancellationToken;

/// How often the sweep runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(600);

/// Run the sweep loop until `cancel` is triggered.
pub async fn run(pool: DbPool, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = SWEEP_INTERVAL.as_secs(),
        "Token sweeper started"
    );

    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Token sweeper stopping");
                break;
            }
            _ = interval.tick() => sweep(&pool).await,
        }
    }
}

async fn sweep(pool: &DbPool) {
    let now = Utc::now();

    match PasswordResetRepo::delete_expired(pool, now).await {
        Ok(0) => tracing::debug!("Token sweeper: no expired reset tokens"),
        Ok(deleted) => tracing::info!(deleted, "Token sweeper: purged expired reset tokens"),
        Err(e) => tracing::error!(error = %e, "Token sweeper: reset token cleanup failed"),
    }

    match UserRepo::clear_expired_otps(pool, now).await {
        Ok(0) => tracing::debug!("Token sweeper: no expired verification codes"),
        Ok(cleared) => tracing::info!(cleared, "Token sweeper: cleared expired verification codes"),
        Err(e) => tracing::error!(error = %e, "Token sweeper: verification code cleanup failed"),
    }
}
