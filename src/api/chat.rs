//! Chat conversation endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;

use crate::vision::ChatTurn;

use super::{ApiError, ApiState};

/// System prompt framing responses for visually impaired users
const SYSTEM_PROMPT: &str = "You are Vista Assist AI, a helpful assistant designed specifically \
     for visually impaired users. Provide clear, concise, and descriptive responses. Focus on \
     being helpful and providing information that would be most useful for someone who cannot \
     see. If describing directions or locations, be very specific.";

/// Build the chat router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .with_state(state)
}

/// Chat response body
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Run one chat turn
///
/// Body: `{ messages: [{role: "user"|"assistant", content: string}] }`.
/// `messages` absent or not an array yields a 400.
async fn chat(
    State(state): State<Arc<ApiState>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<ChatResponse>, ApiError> {
    let messages = body
        .get("messages")
        .and_then(serde_json::Value::as_array)
        .ok_or(ApiError::Validation {
            error: "Invalid request. Messages array is required.",
            message: "The request body must include a `messages` array.",
        })?;

    let turns: Vec<ChatTurn> = messages
        .iter()
        .map(|m| ChatTurn {
            role: m
                .get("role")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("user")
                .to_string(),
            content: m
                .get("content")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string(),
        })
        .collect();

    let vision = state.vision.as_ref().ok_or_else(ApiError::missing_key)?;

    let response = vision.chat(&turns, Some(SYSTEM_PROMPT)).await.map_err(|e| {
        tracing::error!(error = %e, "chat request failed");
        ApiError::Upstream {
            error: "Failed to process chat request",
            message: e.to_string(),
        }
    })?;

    Ok(Json(ChatResponse { response }))
}
