//! Error taxonomy for the animation pipeline.
//!
//! Split by concern so callers can tell a durable-store failure (retry on a
//! later tick) from a remote-service failure (per-scene, fed to the failure
//! policy).

use thiserror::Error;

/// Failures of the durable job-state store.
///
/// `Unavailable` means the operation may or may not have taken effect;
/// callers must treat the last successfully persisted checkpoint as the only
/// source of truth and retry on a later invocation.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("checkpoint store unavailable: {0}")]
    Unavailable(String),

    /// A record exists under the checkpoint slot but could not be decoded,
    /// or decoded into a state that violates the job invariants.
    #[error("checkpoint record corrupt: {0}")]
    Corrupt(String),
}

/// Failures of the scene input / artifact catalog.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset catalog unavailable: {0}")]
    Unavailable(String),
}

/// Failures talking to the remote animation service.
#[derive(Debug, Error)]
pub enum AnimatorError {
    /// The service rejected the signed token or the account credentials.
    #[error("animation service rejected credentials: {0}")]
    Auth(String),

    /// The service throttled the request.
    #[error("animation service rate limited: {0}")]
    RateLimited(String),

    /// The poll budget ran out before the remote task reached a terminal
    /// state. Carries the number of status checks made.
    #[error("animation task not finished after {attempts} status checks")]
    Timeout { attempts: u32 },

    /// The remote task reached its failed state.
    #[error("animation task failed: {0}")]
    TaskFailed(String),

    /// Transport, protocol, or unexpected-response failure.
    #[error("animation service error: {0}")]
    Service(String),
}

/// Job-level pipeline failures.
///
/// Per-scene failures never surface here; they are recorded on the
/// checkpoint and handled by the configured failure policy.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// `start` was refused because a job is already active.
    #[error("an animation job is already active: {story_id} ({language})")]
    Conflict { story_id: String, language: String },

    /// `start` found nothing to animate.
    #[error("no scene inputs found for {story_id} ({language})")]
    NoInputs { story_id: String, language: String },

    /// The in-memory job state broke an invariant, e.g. an illegal status
    /// transition. Indicates a bug, not an environmental failure.
    #[error("job state violates an invariant: {0}")]
    InvalidState(String),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    #[error(transparent)]
    Assets(#[from] AssetError),
}
