//! Client for the external comment-classification service.
//!
//! [`CommentClassifier`] is the seam the analysis pipeline depends on;
//! [`HttpClassifier`] is the production implementation talking to the ML
//! inference endpoint. Classification never fails from the caller's point of
//! view: transport or decoding problems yield [`ClassificationResult::error_sentinel`].

pub mod config;
pub mod http;

use async_trait::async_trait;
use judiguard_core::status::Classification;
use serde::Serialize;

pub use config::ClassifierConfig;
pub use http::HttpClassifier;

/// Version tag recorded alongside every classification.
pub const MODEL_VERSION: &str = "distilbert-flask-v1";

/// Normalized output of one classification call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub classification: Classification,
    pub confidence_score: f64,
    pub model_version: String,
}

impl ClassificationResult {
    /// Result reported when the inference endpoint could not be used.
    pub fn error_sentinel() -> Self {
        Self {
            classification: Classification::ErrorAnalysis,
            confidence_score: 0.0,
            model_version: MODEL_VERSION.to_string(),
        }
    }
}

/// Labels a single piece of text.
#[async_trait]
pub trait CommentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> ClassificationResult;
}

/// Map a raw label from the inference service onto the canonical enumeration.
///
/// Matching is case-insensitive and tolerates `-`/space separators. Only the
/// two decisive labels are accepted; anything else is an analysis error.
pub fn normalize_label(raw: &str) -> Classification {
    let label = raw.trim().to_ascii_uppercase().replace(['-', ' '], "_");
    match label.as_str() {
        "JUDI" => Classification::Judi,
        "NON_JUDI" | "NONJUDI" => Classification::NonJudi,
        _ => Classification::ErrorAnalysis,
    }
}
