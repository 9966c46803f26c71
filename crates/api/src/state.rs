use std::sync::Arc;

use judiguard_classifier::CommentClassifier;
use judiguard_db::DbPool;
use judiguard_pipeline::{AnalysisService, OAuthConnector, PgAnalysisStore, PipelineConfig};
use judiguard_youtube::credentials::PgCredentialStore;
use judiguard_youtube::oauth::GoogleOAuth;
use judiguard_youtube::YouTubeAuthenticator;

use crate::config::ServerConfig;
use crate::notifications::Mailer;

/// Shared application state available to all handlers via Axum's `State` extractor.
///
/// Cheap to clone: everything behind it is a pool handle or an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Analysis and deletion workflows.
    pub analysis: Arc<AnalysisService>,
    /// Comment classifier, also used directly by the text prediction endpoint.
    pub classifier: Arc<dyn CommentClassifier>,
    /// Google OAuth client for the YouTube consent flow.
    pub google: Arc<GoogleOAuth>,
    /// Outbound HTTP client shared by all Google calls.
    pub http: reqwest::Client,
    /// Verification and password reset emails.
    pub mailer: Arc<Mailer>,
}

impl AppState {
    /// Wire the production services together.
    ///
    /// A single [`YouTubeAuthenticator`] lives here so concurrent requests for
    /// the same user share one token refresh.
    pub fn new(
        pool: DbPool,
        config: ServerConfig,
        classifier: Arc<dyn CommentClassifier>,
        pipeline: PipelineConfig,
        mailer: Mailer,
    ) -> Self {
        let http = reqwest::Client::new();
        let google = Arc::new(GoogleOAuth::new(http.clone(), config.youtube.clone()));

        let authenticator = Arc::new(YouTubeAuthenticator::new(
            Arc::new(PgCredentialStore::new(pool.clone())),
            google.clone(),
        ));
        let connector = Arc::new(OAuthConnector::new(
            authenticator,
            http.clone(),
            config.youtube.api_base_url.clone(),
        ));
        let analysis = Arc::new(AnalysisService::new(
            Arc::new(PgAnalysisStore::new(pool.clone())),
            connector,
            classifier.clone(),
            pipeline,
        ));

        Self {
            pool,
            config: Arc::new(config),
            analysis,
            classifier,
            google,
            http,
            mailer: Arc::new(mailer),
        }
    }
}
