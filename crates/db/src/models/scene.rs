//! Scene catalog entity models.
//!
//! Inputs are ingested by upstream tooling; this service only reads them.
//! Artifacts are written by the animation pipeline, one row per scene.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `scene_inputs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SceneInputRow {
    pub id: i64,
    pub story_id: String,
    pub language: String,
    /// 1-based position of the scene within the story. May be sparse.
    pub scene_index: i32,
    pub image_url: String,
    pub motion_prompt: String,
    pub created_at: DateTime<Utc>,
}

/// A row from the `scene_artifacts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SceneArtifactRow {
    pub id: i64,
    pub story_id: String,
    pub language: String,
    pub scene_index: i32,
    pub video_url: String,
    pub remote_task_id: String,
    pub duration_secs: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for recording a generated artifact.
#[derive(Debug, Deserialize)]
pub struct NewSceneArtifact {
    pub story_id: String,
    pub language: String,
    pub scene_index: i32,
    pub video_url: String,
    pub remote_task_id: String,
    pub duration_secs: Option<f64>,
}
