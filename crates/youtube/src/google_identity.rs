//! Google Sign-In ID-token verification via the `tokeninfo` endpoint.

use serde::Deserialize;

use crate::error::YouTubeError;

/// The identity asserted by a verified Google ID token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleIdentity {
    /// Stable Google account id.
    pub sub: String,
    pub email: String,
    pub email_verified: bool,
    pub name: Option<String>,
}

/// `tokeninfo` serialises booleans as strings.
#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: Option<String>,
    sub: Option<String>,
    email: Option<String>,
    email_verified: Option<serde_json::Value>,
    name: Option<String>,
}

fn truthy(value: Option<&serde_json::Value>) -> bool {
    match value {
        Some(serde_json::Value::Bool(b)) => *b,
        Some(serde_json::Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Verify `id_token` with Google and check that it was issued for
/// `expected_audience`.
pub async fn verify_id_token(
    client: &reqwest::Client,
    tokeninfo_url: &str,
    id_token: &str,
    expected_audience: &str,
) -> Result<GoogleIdentity, YouTubeError> {
    let response = client
        .get(tokeninfo_url)
        .query(&[("id_token", id_token)])
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        tracing::warn!(status = status.as_u16(), "Google rejected ID token");
        return Err(YouTubeError::Unauthorized("Invalid Google ID token".to_string()));
    }

    let info: TokenInfo = response.json().await?;
    identity_from_token_info(info, expected_audience)
}

fn identity_from_token_info(
    info: TokenInfo,
    expected_audience: &str,
) -> Result<GoogleIdentity, YouTubeError> {
    if info.aud.as_deref() != Some(expected_audience) {
        return Err(YouTubeError::Unauthorized(
            "Google ID token was issued for another application".to_string(),
        ));
    }

    let email_verified = truthy(info.email_verified.as_ref());
    match (info.sub, info.email) {
        (Some(sub), Some(email)) if !sub.is_empty() && !email.is_empty() => Ok(GoogleIdentity {
            sub,
            email: email.to_lowercase(),
            email_verified,
            name: info.name,
        }),
        _ => Err(YouTubeError::Unauthorized(
            "Google ID token is missing the account id or email".to_string(),
        )),
    }
}
