//! Async ports between the pipeline engine and its collaborators.
//!
//! The engine in `fabula-pipeline` is generic over these traits. Production
//! wires the Postgres checkpoint store, the Postgres scene catalog, and the
//! Kling client; tests substitute in-memory fakes.

use async_trait::async_trait;

use crate::error::{AnimatorError, AssetError, CheckpointError};
use crate::job::AnimationJob;
use crate::scene::{AnimationArtifact, SceneInput};

/// Durable load/save/clear of the singleton job checkpoint.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Load the checkpoint, or `None` when no job is active.
    async fn get(&self) -> Result<Option<AnimationJob>, CheckpointError>;

    /// Persist the checkpoint atomically under the well-known slot.
    async fn save(&self, job: &AnimationJob) -> Result<(), CheckpointError>;

    /// Remove the checkpoint entirely. Clearing an empty slot is a no-op.
    async fn clear(&self) -> Result<(), CheckpointError>;
}

/// Scene catalog: per-scene inputs on the read side, artifacts on the write
/// side.
#[async_trait]
pub trait AssetLocator: Send + Sync {
    /// Number of scene inputs available for the story at start time.
    ///
    /// Counts what exists, not the highest index: with sparse inputs the
    /// visited range `1..=total` can contain gaps, which step processing
    /// skips over.
    async fn count_inputs(&self, story_id: &str, language: &str) -> Result<u32, AssetError>;

    /// Input for one scene, or `None` when the scene has no input.
    async fn get_input(
        &self,
        story_id: &str,
        language: &str,
        scene: u32,
    ) -> Result<Option<SceneInput>, AssetError>;

    /// Whether an artifact for the scene is already recorded. Short-circuits
    /// re-submission when a job resumes mid-story.
    async fn output_exists(
        &self,
        story_id: &str,
        language: &str,
        scene: u32,
    ) -> Result<bool, AssetError>;

    /// Record the artifact for a scene, returning the catalog row id.
    /// Overwrites any existing record for the same scene.
    async fn store(
        &self,
        story_id: &str,
        language: &str,
        scene: u32,
        artifact: &AnimationArtifact,
    ) -> Result<i64, AssetError>;
}

/// Submit one scene to the remote service and wait, bounded, for the video.
#[async_trait]
pub trait SceneAnimator: Send + Sync {
    async fn generate(&self, input: &SceneInput) -> Result<AnimationArtifact, AnimatorError>;
}
