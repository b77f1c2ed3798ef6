//! Direct tests of the `AppError` -> HTTP response mapping.
//!
//! No server needed: each test builds an error value, renders it through
//! `IntoResponse`, and inspects the status plus the JSON body. The
//! sanitization checks matter most here, since 500-class errors carry
//! storage internals in their `Display` text.

use axum::response::IntoResponse;
use http_body_util::BodyExt;

use fabula_api::error::AppError;
use fabula_core::error::{AssetError, CheckpointError, PipelineError};

/// Render an error and parse its JSON body.
async fn render(err: AppError) -> (axum::http::StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

// ---------------------------------------------------------------------------
// Test: Conflict maps to 409 naming the active job
// ---------------------------------------------------------------------------

#[tokio::test]
async fn conflict_maps_to_409() {
    let err = AppError::Pipeline(PipelineError::Conflict {
        story_id: "story-1".to_string(),
        language: "en".to_string(),
    });

    let (status, json) = render(err).await;

    assert_eq!(status, axum::http::StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
    assert!(json["error"].as_str().unwrap().contains("story-1"));
}

// ---------------------------------------------------------------------------
// Test: NoInputs maps to 422
// ---------------------------------------------------------------------------

#[tokio::test]
async fn no_inputs_maps_to_422() {
    let err = AppError::Pipeline(PipelineError::NoInputs {
        story_id: "story-9".to_string(),
        language: "de".to_string(),
    });

    let (status, json) = render(err).await;

    assert_eq!(status, axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "NO_INPUTS");
    assert!(json["error"].as_str().unwrap().contains("story-9"));
}

// ---------------------------------------------------------------------------
// Test: NotFound maps to 404 with the given message
// ---------------------------------------------------------------------------

#[tokio::test]
async fn not_found_maps_to_404() {
    let err = AppError::NotFound("No active animation job");

    let (status, json) = render(err).await;

    assert_eq!(status, axum::http::StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "No active animation job");
}

// ---------------------------------------------------------------------------
// Test: store outage maps to 503 and hides the connection detail
// ---------------------------------------------------------------------------

#[tokio::test]
async fn store_outage_maps_to_503_and_sanitizes() {
    let err = AppError::Pipeline(PipelineError::Checkpoint(CheckpointError::Unavailable(
        "connection refused on 10.0.0.5:5432".to_string(),
    )));

    let (status, json) = render(err).await;

    assert_eq!(status, axum::http::StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "STORE_UNAVAILABLE");
    assert!(
        !json.to_string().contains("10.0.0.5"),
        "Outage response must not leak connection details"
    );
}

// ---------------------------------------------------------------------------
// Test: corrupt checkpoint maps to 500 and hides the decode detail
// ---------------------------------------------------------------------------

#[tokio::test]
async fn corrupt_checkpoint_maps_to_500_and_sanitizes() {
    let err = AppError::Pipeline(PipelineError::Checkpoint(CheckpointError::Corrupt(
        "invalid JSON at byte 17".to_string(),
    )));

    let (status, json) = render(err).await;

    assert_eq!(status, axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "CHECKPOINT_CORRUPT");
    assert!(!json.to_string().contains("byte 17"));
}

// ---------------------------------------------------------------------------
// Test: invalid job state maps to 500 and hides the invariant detail
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_state_maps_to_500_and_sanitizes() {
    let err = AppError::Pipeline(PipelineError::InvalidState(
        "cursor 999 outside 1..=4".to_string(),
    ));

    let (status, json) = render(err).await;

    assert_eq!(status, axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INVALID_STATE");
    assert!(!json.to_string().contains("999"));
}

// ---------------------------------------------------------------------------
// Test: scene catalog outage maps to 503
// ---------------------------------------------------------------------------

#[tokio::test]
async fn catalog_outage_maps_to_503() {
    let err = AppError::Pipeline(PipelineError::Assets(AssetError::Unavailable(
        "pool timed out".to_string(),
    )));

    let (status, json) = render(err).await;

    assert_eq!(status, axum::http::StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "CATALOG_UNAVAILABLE");
}
