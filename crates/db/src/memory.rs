//! In-memory checkpoint store for development and testing.

use std::sync::RwLock;

use async_trait::async_trait;

use fabula_core::error::CheckpointError;
use fabula_core::job::AnimationJob;
use fabula_core::ports::CheckpointStore;

/// `CheckpointStore` holding the checkpoint in process memory.
///
/// Nothing survives the process; use it only where that is the point.
#[derive(Default)]
pub struct MemoryCheckpointStore {
    state: RwLock<Option<AnimationJob>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn get(&self) -> Result<Option<AnimationJob>, CheckpointError> {
        let state = self
            .state
            .read()
            .map_err(|e| CheckpointError::Unavailable(e.to_string()))?;
        Ok(state.clone())
    }

    async fn save(&self, job: &AnimationJob) -> Result<(), CheckpointError> {
        let mut state = self
            .state
            .write()
            .map_err(|e| CheckpointError::Unavailable(e.to_string()))?;
        *state = Some(job.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), CheckpointError> {
        let mut state = self
            .state
            .write()
            .map_err(|e| CheckpointError::Unavailable(e.to_string()))?;
        *state = None;
        Ok(())
    }
}
