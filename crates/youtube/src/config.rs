//! Google / YouTube endpoint and OAuth client configuration.

/// Default YouTube Data API v3 base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
/// Default Google OAuth2 token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
/// Default Google OAuth2 consent endpoint.
pub const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
/// Default Google ID-token verification endpoint.
pub const DEFAULT_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// OAuth scope needed to read, delete, and moderate comments.
pub const YOUTUBE_SCOPE: &str = "https://www.googleapis.com/auth/youtube.force-ssl";

/// Configuration for talking to Google on behalf of users.
#[derive(Debug, Clone)]
pub struct YouTubeConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// Server API key for unauthenticated reads (video metadata).
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub token_url: String,
    pub auth_url: String,
    pub tokeninfo_url: String,
    /// OAuth client id accepted as the audience of Google Sign-In ID tokens.
    pub sign_in_client_id: Option<String>,
}

impl YouTubeConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                    | Required | Default                                     |
    /// |----------------------------|----------|---------------------------------------------|
    /// | `YOUTUBE_CLIENT_ID`        | **yes**  | --                                          |
    /// | `YOUTUBE_CLIENT_SECRET`    | **yes**  | --                                          |
    /// | `YOUTUBE_REDIRECT_URI`     | **yes**  | --                                          |
    /// | `YOUTUBE_API_KEY`          | no       | --                                          |
    /// | `YOUTUBE_API_BASE_URL`     | no       | `https://www.googleapis.com/youtube/v3`     |
    /// | `GOOGLE_OAUTH_TOKEN_URL`   | no       | `https://oauth2.googleapis.com/token`       |
    /// | `GOOGLE_OAUTH_AUTH_URL`    | no       | `https://accounts.google.com/o/oauth2/v2/auth` |
    /// | `GOOGLE_TOKENINFO_URL`     | no       | `https://oauth2.googleapis.com/tokeninfo`   |
    /// | `GOOGLE_SIGN_IN_CLIENT_ID` | no       | --                                          |
    ///
    /// # Panics
    ///
    /// Panics if any required variable is missing.
    pub fn from_env() -> Self {
        let required = |name: &str| {
            std::env::var(name).unwrap_or_else(|_| panic!("{name} must be set in the environment"))
        };
        let optional = |name: &str, default: &str| {
            std::env::var(name).unwrap_or_else(|_| default.to_string())
        };

        Self {
            client_id: required("YOUTUBE_CLIENT_ID"),
            client_secret: required("YOUTUBE_CLIENT_SECRET"),
            redirect_uri: required("YOUTUBE_REDIRECT_URI"),
            api_key: std::env::var("YOUTUBE_API_KEY").ok().filter(|k| !k.is_empty()),
            api_base_url: optional("YOUTUBE_API_BASE_URL", DEFAULT_API_BASE_URL),
            token_url: optional("GOOGLE_OAUTH_TOKEN_URL", DEFAULT_TOKEN_URL),
            auth_url: optional("GOOGLE_OAUTH_AUTH_URL", DEFAULT_AUTH_URL),
            tokeninfo_url: optional("GOOGLE_TOKENINFO_URL", DEFAULT_TOKENINFO_URL),
            sign_in_client_id: std::env::var("GOOGLE_SIGN_IN_CLIENT_ID")
                .ok()
                .filter(|k| !k.is_empty()),
        }
    }
}
