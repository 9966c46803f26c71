//! Public single-text classification.

use axum::extract::State;
use axum::Json;
use judiguard_classifier::ClassificationResult;
use judiguard_core::error::CoreError;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

const MAX_TEXT_LENGTH: usize = 10_000;

/// Request body for `POST /text/predict`.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub text: String,
}

/// POST /api/v1/text/predict
///
/// An unreachable model yields the `ERROR_ANALYSIS` result, not an error.
pub async fn predict(
    State(state): State<AppState>,
    Json(input): Json<PredictRequest>,
) -> AppResult<Json<DataResponse<ClassificationResult>>> {
    let text = input.text.trim();
    if text.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Text must not be empty".into(),
        )));
    }
    if text.chars().count() > MAX_TEXT_LENGTH {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Text must be at most {MAX_TEXT_LENGTH} characters"
        ))));
    }

    let result = state.classifier.classify(text).await;
    Ok(Json(DataResponse::new(result)))
}
