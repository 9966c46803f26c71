use judiguard_youtube::YouTubeConfig;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except the JWT
/// secret and the Google OAuth client, which must be provided.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3001`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// Timeout in seconds for ordinary requests (default: `30`).
    pub request_timeout_secs: u64,
    /// Timeout in seconds for the `/analysis` routes (default: `300`).
    ///
    /// Ingestion and batch deletion answer once the work is done. When this
    /// fires the client gets a 408 but the work still runs to completion.
    pub analysis_timeout_secs: u64,
    /// Base URL of the web client, used to build links sent by email.
    pub frontend_url: String,
    /// JWT token configuration.
    pub jwt: JwtConfig,
    /// Google OAuth client and YouTube endpoints.
    pub youtube: YouTubeConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3001`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `ANALYSIS_TIMEOUT_SECS`| `300`                      |
    /// | `FRONTEND_URL`         | `http://localhost:5173`    |
    ///
    /// See [`JwtConfig::from_env`] and [`YouTubeConfig::from_env`] for the
    /// nested sections.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3001".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let analysis_timeout_secs: u64 = std::env::var("ANALYSIS_TIMEOUT_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("ANALYSIS_TIMEOUT_SECS must be a valid u64");

        let frontend_url = std::env::var("FRONTEND_URL")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .trim_end_matches('/')
            .to_string();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            analysis_timeout_secs,
            frontend_url,
            jwt: JwtConfig::from_env(),
            youtube: YouTubeConfig::from_env(),
        }
    }
}
