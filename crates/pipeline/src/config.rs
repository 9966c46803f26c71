/// Limits applied to one analysis run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// `maxResults` requested per `commentThreads.list` page (1..=100).
    pub page_size: u32,
    /// Maximum number of comment threads fetched per analysis.
    pub comment_limit: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            comment_limit: 200,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                     | Default |
    /// |-----------------------------|---------|
    /// | `MAX_COMMENTS_PER_ANALYSIS` | `200`   |
    /// | `COMMENTS_PAGE_SIZE`        | `100`   |
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            page_size: std::env::var("COMMENTS_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.page_size),
            comment_limit: std::env::var("MAX_COMMENTS_PER_ANALYSIS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.comment_limit),
        }
    }
}
