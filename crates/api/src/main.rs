use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use judiguard_api::background;
use judiguard_api::config::ServerConfig;
use judiguard_api::notifications::{EmailConfig, Mailer};
use judiguard_api::router::build_app_router;
use judiguard_api::state::AppState;
use judiguard_classifier::{ClassifierConfig, HttpClassifier};
use judiguard_pipeline::PipelineConfig;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "judiguard_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let classifier_config = ClassifierConfig::from_env();
    let pipeline_config = PipelineConfig::from_env();
    tracing::info!(
        ml_api_url = %classifier_config.base_url,
        comment_limit = pipeline_config.comment_limit,
        "Loaded analysis configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = judiguard_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    judiguard_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    judiguard_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Services ---
    let classifier =
        HttpClassifier::new(&classifier_config).expect("Failed to build classifier HTTP client");
    let mailer = Mailer::new(EmailConfig::from_env());

    // --- Background tasks ---
    let sweeper_cancel = CancellationToken::new();
    let sweeper_handle = tokio::spawn(background::token_sweeper::run(
        pool.clone(),
        sweeper_cancel.clone(),
    ));

    // --- App state + router ---
    let state = AppState::new(
        pool,
        config.clone(),
        Arc::new(classifier),
        pipeline_config,
        mailer,
    );
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    sweeper_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), sweeper_handle).await;
    tracing::info!("Token sweeper stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
