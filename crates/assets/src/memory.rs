//! Seedable in-memory scene catalog for tests and local runs.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use fabula_core::error::AssetError;
use fabula_core::ports::AssetLocator;
use fabula_core::scene::{AnimationArtifact, SceneInput};

type SceneKey = (String, String, u32);

fn key(story_id: &str, language: &str, scene: u32) -> SceneKey {
    (story_id.to_string(), language.to_string(), scene)
}

/// `AssetLocator` over in-process maps.
///
/// Seed inputs (and optionally pre-existing artifacts) before handing it to
/// the pipeline; stored artifacts can be inspected afterwards.
#[derive(Default)]
pub struct MemoryAssetLocator {
    inputs: RwLock<HashMap<SceneKey, SceneInput>>,
    artifacts: RwLock<HashMap<SceneKey, AnimationArtifact>>,
}

impl MemoryAssetLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the input for one scene.
    pub async fn add_input(&self, story_id: &str, language: &str, scene: u32, input: SceneInput) {
        self.inputs
            .write()
            .await
            .insert(key(story_id, language, scene), input);
    }

    /// Seed an already-generated artifact, as left behind by an earlier run.
    pub async fn add_artifact(
        &self,
        story_id: &str,
        language: &str,
        scene: u32,
        artifact: AnimationArtifact,
    ) {
        self.artifacts
            .write()
            .await
            .insert(key(story_id, language, scene), artifact);
    }

    /// The artifact recorded for one scene, if any.
    pub async fn artifact(
        &self,
        story_id: &str,
        language: &str,
        scene: u32,
    ) -> Option<AnimationArtifact> {
        self.artifacts
            .read()
            .await
            .get(&key(story_id, language, scene))
            .cloned()
    }

    /// Number of artifacts recorded so far.
    pub async fn artifact_count(&self) -> usize {
        self.artifacts.read().await.len()
    }
}

#[async_trait]
impl AssetLocator for MemoryAssetLocator {
    async fn count_inputs(&self, story_id: &str, language: &str) -> Result<u32, AssetError> {
        let inputs = self.inputs.read().await;
        let count = inputs
            .keys()
            .filter(|(s, l, _)| s == story_id && l == language)
            .count();
        Ok(count as u32)
    }

    async fn get_input(
        &self,
        story_id: &str,
        language: &str,
        scene: u32,
    ) -> Result<Option<SceneInput>, AssetError> {
        let inputs = self.inputs.read().await;
        Ok(inputs.get(&key(story_id, language, scene)).cloned())
    }

    async fn output_exists(
        &self,
        story_id: &str,
        language: &str,
        scene: u32,
    ) -> Result<bool, AssetError> {
        let artifacts = self.artifacts.read().await;
        Ok(artifacts.contains_key(&key(story_id, language, scene)))
    }

    async fn store(
        &self,
        story_id: &str,
        language: &str,
        scene: u32,
        artifact: &AnimationArtifact,
    ) -> Result<i64, AssetError> {
        let mut artifacts = self.artifacts.write().await;
        artifacts.insert(key(story_id, language, scene), artifact.clone());
        Ok(artifacts.len() as i64)
    }
}
