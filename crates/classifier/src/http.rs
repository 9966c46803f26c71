//! HTTP implementation of [`CommentClassifier`].
//!
//! Sends `POST {base_url}/api/predict` with `{"text": ...}` and expects
//! `{"classification": ..., "confidenceScore": ...}` back.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::ClassifierConfig;
use crate::{normalize_label, ClassificationResult, CommentClassifier, MODEL_VERSION};

/// Errors from the inference endpoint. Never surfaced past [`HttpClassifier::classify`].
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, body decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Classifier API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PredictResponse {
    classification: String,
    confidence_score: f64,
}

/// Classification client backed by the ML inference service.
pub struct HttpClassifier {
    client: reqwest::Client,
    predict_url: String,
}

impl HttpClassifier {
    /// Build a client whose requests time out after `config.timeout`.
    pub fn new(config: &ClassifierConfig) -> Result<Self, ClassifierError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_client(client, config))
    }

    /// Create a classifier reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: &ClassifierConfig) -> Self {
        Self {
            client,
            predict_url: format!("{}/api/predict", config.base_url),
        }
    }

    /// Call the inference endpoint, surfacing every failure.
    pub async fn predict(&self, text: &str) -> Result<ClassificationResult, ClassifierError> {
        let response = self
            .client
            .post(&self.predict_url)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ClassifierError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: PredictResponse = response.json().await?;
        Ok(ClassificationResult {
            classification: normalize_label(&parsed.classification),
            confidence_score: parsed.confidence_score,
            model_version: MODEL_VERSION.to_string(),
        })
    }
}

#[async_trait]
impl CommentClassifier for HttpClassifier {
    async fn classify(&self, text: &str) -> ClassificationResult {
        match self.predict(text).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(error = %e, "Classifier call failed, recording ERROR_ANALYSIS");
                ClassificationResult::error_sentinel()
            }
        }
    }
}
