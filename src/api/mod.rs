//! HTTP API server for the Vista gateway

pub mod analyze;
pub mod chat;
pub mod health;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::vision::GeminiClient;
use crate::Result;

/// Shared state for API handlers
pub struct ApiState {
    /// Vision backend; `None` when the `GOOGLE_API_KEY` credential is absent,
    /// in which case both endpoints fail fast with a configuration error
    pub vision: Option<GeminiClient>,
}

impl ApiState {
    /// Build state from configuration
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let vision = config.api_keys.google.as_ref().and_then(|key| {
            GeminiClient::new(key.clone())
                .map(|c| c.with_model(config.vision_model.clone()))
                .ok()
        });

        if vision.is_none() {
            tracing::warn!("GOOGLE_API_KEY not configured - analyze and chat endpoints will return 500");
        }

        Self { vision }
    }
}

/// Build the router with all routes
#[must_use]
pub fn router(state: Arc<ApiState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(analyze::router(state.clone()))
        .merge(chat::router(state.clone()))
        .merge(health::router(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
}

impl ApiServer {
    /// Create a server from configuration
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            state: Arc::new(ApiState::from_config(config)),
            port: config.api_server.port,
        }
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if the server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(port = self.port, "API server listening");

        axum::serve(listener, router(self.state))
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }

    /// Run the API server in a background task
    #[must_use]
    pub fn spawn(self) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}

/// API errors, serialized as `{ error, message }` JSON
#[derive(Debug)]
pub enum ApiError {
    /// Missing server credential, served as 500
    Config { error: &'static str, message: &'static str },
    /// Malformed request body, served as 400
    Validation { error: &'static str, message: &'static str },
    /// Upstream model call failed, served as 500
    Upstream { error: &'static str, message: String },
}

impl ApiError {
    /// The required credential is absent
    #[must_use]
    pub const fn missing_key() -> Self {
        Self::Config {
            error: "API key is not configured",
            message: "Set GOOGLE_API_KEY to enable the vision service.",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorBody {
            error: String,
            message: String,
        }

        let (status, error, message) = match self {
            Self::Config { error, message } => {
                (StatusCode::INTERNAL_SERVER_ERROR, error.to_string(), message.to_string())
            }
            Self::Validation { error, message } => {
                (StatusCode::BAD_REQUEST, error.to_string(), message.to_string())
            }
            Self::Upstream { error, message } => {
                (StatusCode::INTERNAL_SERVER_ERROR, error.to_string(), message)
            }
        };

        (status, Json(ErrorBody { error, message })).into_response()
    }
}
