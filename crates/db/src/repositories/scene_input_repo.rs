//! Repository for the `scene_inputs` table.

use sqlx::PgPool;

use crate::models::scene::SceneInputRow;

/// Column list shared across queries.
const COLUMNS: &str = "id, story_id, language, scene_index, image_url, motion_prompt, created_at";

/// Read access to the scene inputs ingested for a story edition.
pub struct SceneInputRepo;

impl SceneInputRepo {
    /// Count the inputs available for a story edition.
    pub async fn count(pool: &PgPool, story_id: &str, language: &str) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM scene_inputs WHERE story_id = $1 AND language = $2",
        )
        .bind(story_id)
        .bind(language)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Find the input for one scene, if ingested.
    pub async fn find_by_scene(
        pool: &PgPool,
        story_id: &str,
        language: &str,
        scene_index: i32,
    ) -> Result<Option<SceneInputRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM scene_inputs \
             WHERE story_id = $1 AND language = $2 AND scene_index = $3"
        );
        sqlx::query_as::<_, SceneInputRow>(&query)
            .bind(story_id)
            .bind(language)
            .bind(scene_index)
            .fetch_optional(pool)
            .await
    }
}
