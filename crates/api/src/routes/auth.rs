use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{auth, youtube};
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /register                 -> register
/// POST /verify-otp               -> verify_otp
/// POST /resend-otp               -> resend_otp
/// POST /login                    -> login
/// POST /google/signin            -> google_sign_in
/// POST /forgot-password          -> forgot_password
/// PUT  /reset-password/{token}   -> reset_password
/// PUT  /change-password          -> change_password (auth)
/// GET  /youtube/connect          -> youtube::connect (auth)
/// GET  /youtube/callback         -> youtube::callback
/// POST /youtube/disconnect       -> youtube::disconnect (auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/verify-otp", post(auth::verify_otp))
        .route("/resend-otp", post(auth::resend_otp))
        .route("/login", post(auth::login))
        .route("/google/signin", post(auth::google_sign_in))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password/{token}", put(auth::reset_password))
        .route("/change-password", put(auth::change_password))
        .route("/youtube/connect", get(youtube::connect))
        .route("/youtube/callback", get(youtube::callback))
        .route("/youtube/disconnect", post(youtube::disconnect))
}
