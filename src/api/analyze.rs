//! Image analysis endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;

use super::{ApiError, ApiState};

/// Build the analyze router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/analyze-image", post(analyze_image))
        .with_state(state)
}

/// Analysis response body
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub analysis: String,
}

/// Analyze an image
///
/// Body: `{ image: base64 string (no data-URI prefix), prompt: string }`.
/// The body is validated by hand so a missing image yields a 400 with the
/// documented shape rather than a framework rejection.
async fn analyze_image(
    State(state): State<Arc<ApiState>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let image = body
        .get("image")
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or(ApiError::Validation {
            error: "Invalid request. Image data is required.",
            message: "The request body must include a non-empty base64 `image` field.",
        })?;

    let prompt = body
        .get("prompt")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default();

    let vision = state.vision.as_ref().ok_or_else(ApiError::missing_key)?;

    let analysis = vision.describe_image(image, prompt).await.map_err(|e| {
        tracing::error!(error = %e, "image analysis failed");
        ApiError::Upstream {
            error: "Failed to analyze image",
            message: e.to_string(),
        }
    })?;

    Ok(Json(AnalyzeResponse { analysis }))
}
