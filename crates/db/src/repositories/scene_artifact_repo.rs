//! Repository for the `scene_artifacts` table.

use sqlx::PgPool;

use crate::models::scene::{NewSceneArtifact, SceneArtifactRow};

/// Column list shared across queries.
const COLUMNS: &str = "id, story_id, language, scene_index, video_url, remote_task_id, \
    duration_secs, created_at, updated_at";

/// Write and probe access to generated scene artifacts.
pub struct SceneArtifactRepo;

impl SceneArtifactRepo {
    /// Whether an artifact is already recorded for a scene.
    pub async fn exists(
        pool: &PgPool,
        story_id: &str,
        language: &str,
        scene_index: i32,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS( \
                 SELECT 1 FROM scene_artifacts \
                 WHERE story_id = $1 AND language = $2 AND scene_index = $3 \
             )",
        )
        .bind(story_id)
        .bind(language)
        .bind(scene_index)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// Record the artifact for a scene, returning the stored row.
    ///
    /// Uses `ON CONFLICT` to upsert: a replayed scene replaces its previous
    /// artifact instead of failing on the unique constraint.
    pub async fn upsert(
        pool: &PgPool,
        input: &NewSceneArtifact,
    ) -> Result<SceneArtifactRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO scene_artifacts \
                 (story_id, language, scene_index, video_url, remote_task_id, duration_secs) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (story_id, language, scene_index) DO UPDATE SET \
                 video_url      = EXCLUDED.video_url, \
                 remote_task_id = EXCLUDED.remote_task_id, \
                 duration_secs  = EXCLUDED.duration_secs, \
                 updated_at     = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SceneArtifactRow>(&query)
            .bind(&input.story_id)
            .bind(&input.language)
            .bind(input.scene_index)
            .bind(&input.video_url)
            .bind(&input.remote_task_id)
            .bind(input.duration_secs)
            .fetch_one(pool)
            .await
    }
}
