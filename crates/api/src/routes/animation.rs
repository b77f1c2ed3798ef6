//! Animation job endpoints: start a run, nudge it one step, inspect it,
//! abandon it.
//!
//! The pipeline owns all job semantics. Handlers translate between HTTP and
//! [`AnimationPipeline`] calls and never touch the checkpoint store
//! directly.
//!
//! [`AnimationPipeline`]: fabula_pipeline::engine::AnimationPipeline

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /animation/jobs`.
#[derive(Debug, Deserialize)]
pub struct StartJobRequest {
    /// Story to animate.
    pub story_id: String,
    /// Language edition of the story.
    pub language: String,
}

/// POST /api/v1/animation/jobs
///
/// Start animating a story edition. Scene 1 is processed before the
/// response is sent; remaining scenes run on the continuation timer.
/// Returns 201 with the start summary, 409 while any job is active, 422
/// when the edition has no scene inputs.
async fn start_job(
    State(state): State<AppState>,
    Json(input): Json<StartJobRequest>,
) -> AppResult<impl IntoResponse> {
    let started = state
        .pipeline
        .start(&input.story_id, &input.language)
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: started })))
}

/// POST /api/v1/animation/jobs/step
///
/// Process exactly one pending scene and report the outcome. Normally the
/// continuation timer drives steps; this endpoint exists for manual
/// nudging. With no active job the outcome is `idle`.
async fn run_step(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let outcome = state.pipeline.run_next().await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// GET /api/v1/animation/jobs/current
///
/// Report the current job checkpoint, or 404 when no job is active.
async fn current_job(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let job = state
        .pipeline
        .status()
        .await?
        .ok_or(AppError::NotFound("No active animation job"))?;

    Ok(Json(DataResponse { data: job }))
}

/// DELETE /api/v1/animation/jobs/current
///
/// Out-of-band cancel: disarm the continuation timer and drop the
/// checkpoint. Returns 204 whether or not a job existed. The remote
/// service is not notified; an in-flight task finishes unobserved.
async fn abort_job(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    state.pipeline.abort().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Routes mounted at `/animation`.
///
/// ```text
/// POST   /jobs          -> start_job
/// POST   /jobs/step     -> run_step
/// GET    /jobs/current  -> current_job
/// DELETE /jobs/current  -> abort_job
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/jobs", post(start_job))
        .route("/jobs/step", post(run_step))
        .route("/jobs/current", get(current_job).delete(abort_job))
}
