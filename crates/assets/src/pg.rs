//! `AssetLocator` backed by the Postgres scene catalog.

use async_trait::async_trait;

use fabula_core::error::AssetError;
use fabula_core::ports::AssetLocator;
use fabula_core::scene::{AnimationArtifact, SceneInput};
use fabula_db::models::scene::NewSceneArtifact;
use fabula_db::repositories::{SceneArtifactRepo, SceneInputRepo};
use fabula_db::DbPool;

/// Scene catalog reader/writer over the shared connection pool.
#[derive(Clone)]
pub struct PgAssetLocator {
    pool: DbPool,
}

impl PgAssetLocator {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssetLocator for PgAssetLocator {
    async fn count_inputs(&self, story_id: &str, language: &str) -> Result<u32, AssetError> {
        let count = SceneInputRepo::count(&self.pool, story_id, language)
            .await
            .map_err(unavailable)?;
        Ok(count.max(0) as u32)
    }

    async fn get_input(
        &self,
        story_id: &str,
        language: &str,
        scene: u32,
    ) -> Result<Option<SceneInput>, AssetError> {
        let row = SceneInputRepo::find_by_scene(&self.pool, story_id, language, scene as i32)
            .await
            .map_err(unavailable)?;
        Ok(row.map(|r| SceneInput {
            image_url: r.image_url,
            motion_prompt: r.motion_prompt,
        }))
    }

    async fn output_exists(
        &self,
        story_id: &str,
        language: &str,
        scene: u32,
    ) -> Result<bool, AssetError> {
        SceneArtifactRepo::exists(&self.pool, story_id, language, scene as i32)
            .await
            .map_err(unavailable)
    }

    async fn store(
        &self,
        story_id: &str,
        language: &str,
        scene: u32,
        artifact: &AnimationArtifact,
    ) -> Result<i64, AssetError> {
        let row = SceneArtifactRepo::upsert(
            &self.pool,
            &NewSceneArtifact {
                story_id: story_id.to_string(),
                language: language.to_string(),
                scene_index: scene as i32,
                video_url: artifact.video_url.clone(),
                remote_task_id: artifact.remote_task_id.clone(),
                duration_secs: artifact.duration_secs,
            },
        )
        .await
        .map_err(unavailable)?;
        Ok(row.id)
    }
}

fn unavailable(err: sqlx::Error) -> AssetError {
    AssetError::Unavailable(err.to_string())
}
