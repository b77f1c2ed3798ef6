//! Scene inputs and the artifacts generated from them.

use serde::{Deserialize, Serialize};

/// One scene awaiting animation: the illustrated frame plus the motion
/// description handed to the video service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneInput {
    /// Publicly fetchable URL of the scene illustration.
    pub image_url: String,
    /// Free-text description of the desired motion.
    pub motion_prompt: String,
}

/// A generated animation, as recorded in the artifact catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationArtifact {
    /// Where the service hosts the rendered video.
    pub video_url: String,
    /// Remote task that produced it, kept for support lookups.
    pub remote_task_id: String,
    /// Video length in seconds, when the service reports one.
    pub duration_secs: Option<f64>,
}
