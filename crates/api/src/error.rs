use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use fabula_core::error::{AssetError, CheckpointError, PipelineError};

/// Error type returned by HTTP handlers.
///
/// Wraps [`PipelineError`] for domain errors and adds HTTP-specific
/// variants. Implements [`IntoResponse`] so every handler error renders as
/// the same JSON shape.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from the animation pipeline.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// The requested resource does not exist.
    #[error("{0}")]
    NotFound(&'static str),
}

/// Shorthand for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Pipeline(pipeline) => match pipeline {
                PipelineError::Conflict { .. } => {
                    (StatusCode::CONFLICT, "CONFLICT", pipeline.to_string())
                }
                PipelineError::NoInputs { .. } => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "NO_INPUTS",
                    pipeline.to_string(),
                ),
                PipelineError::InvalidState(reason) => {
                    tracing::error!(error = %reason, "Job checkpoint violates an invariant");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INVALID_STATE",
                        "The job checkpoint is invalid; clear it and start again".to_string(),
                    )
                }
                PipelineError::Checkpoint(err) => classify_checkpoint_error(err),
                PipelineError::Assets(AssetError::Unavailable(detail)) => {
                    tracing::error!(error = %detail, "Scene catalog unavailable");
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "CATALOG_UNAVAILABLE",
                        "The scene catalog is temporarily unavailable".to_string(),
                    )
                }
            },

            AppError::NotFound(what) => (StatusCode::NOT_FOUND, "NOT_FOUND", (*what).to_string()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a checkpoint-store failure into an HTTP status, error code, and
/// message.
///
/// - `Unavailable` maps to 503: the write may retry, and the timer-driven
///   step retries on its own anyway.
/// - `Corrupt` maps to 500 with a sanitized message; the detail goes to the
///   log only.
fn classify_checkpoint_error(err: &CheckpointError) -> (StatusCode, &'static str, String) {
    match err {
        CheckpointError::Unavailable(detail) => {
            tracing::error!(error = %detail, "Checkpoint store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "STORE_UNAVAILABLE",
                "The checkpoint store is temporarily unavailable".to_string(),
            )
        }
        CheckpointError::Corrupt(detail) => {
            tracing::error!(error = %detail, "Checkpoint record corrupt");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CHECKPOINT_CORRUPT",
                "The job checkpoint could not be read".to_string(),
            )
        }
    }
}
