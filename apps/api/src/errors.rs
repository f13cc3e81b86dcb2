use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::graph::GraphError;
use crate::recommend::RecommendError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Knowledge graph is not loaded")]
    GraphUnavailable,

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}

impl From<RecommendError> for AppError {
    fn from(err: RecommendError) -> Self {
        match err {
            RecommendError::Input(msg) => AppError::Input(msg),
            RecommendError::GraphUnavailable => AppError::GraphUnavailable,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Input(msg) => (StatusCode::BAD_REQUEST, "INPUT_ERROR", msg.clone()),
            AppError::GraphUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "GRAPH_UNAVAILABLE",
                "The job knowledge graph is not loaded".to_string(),
            ),
            AppError::Graph(GraphError::NotFound(path)) => {
                tracing::warn!("Graph file not found: {}", path.display());
                (
                    StatusCode::NOT_FOUND,
                    "GRAPH_NOT_FOUND",
                    self.to_string(),
                )
            }
            AppError::Graph(GraphError::Format(msg)) => {
                tracing::error!("Graph format error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "GRAPH_FORMAT_ERROR",
                    self.to_string(),
                )
            }
            AppError::Graph(GraphError::Io(e)) => {
                tracing::error!("Graph I/O error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "GRAPH_IO_ERROR",
                    "The graph file could not be read".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
