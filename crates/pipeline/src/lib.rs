//! Comment analysis orchestration.
//!
//! [`AnalysisService`] drives an analysis run end to end (fetch, dedupe,
//! classify, persist) and the deletion workflows for flagged comments. It
//! depends on three seams so it can be exercised without network or database:
//! [`store::AnalysisStore`], [`connector::YouTubeConnector`] and
//! [`judiguard_classifier::CommentClassifier`].

pub mod config;
pub mod connector;
pub mod error;
pub mod ingest;
pub mod moderation;
pub mod store;

#[cfg(test)]
mod testing;

pub use config::PipelineConfig;
pub use connector::{OAuthConnector, YouTubeConnector};
pub use error::PipelineError;
pub use ingest::AnalysisService;
pub use store::{AnalysisStore, PgAnalysisStore};
