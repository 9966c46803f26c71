use judiguard_core::error::CoreError;
use judiguard_youtube::YouTubeError;

/// Errors surfaced by the analysis and deletion workflows.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    YouTube(#[from] YouTubeError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
