use std::time::Duration;

/// Default request timeout for one inference call.
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Configuration for the inference endpoint.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Base URL of the inference service, e.g. `http://localhost:5000`.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ClassifierConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var               | Required | Default |
    /// |-----------------------|----------|---------|
    /// | `ML_API_URL`          | **yes**  | --      |
    /// | `ML_API_TIMEOUT_SECS` | no       | `15`    |
    ///
    /// # Panics
    ///
    /// Panics if `ML_API_URL` is not set.
    pub fn from_env() -> Self {
        let base_url = std::env::var("ML_API_URL").expect("ML_API_URL must be set");

        let timeout_secs: u64 = std::env::var("ML_API_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .expect("ML_API_TIMEOUT_SECS must be a valid u64");

        Self::new(base_url, Duration::from_secs(timeout_secs))
    }

    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }
}
