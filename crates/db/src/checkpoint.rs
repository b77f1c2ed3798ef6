//! Durable storage for the singleton animation-job checkpoint.
//!
//! The checkpoint is a single JSONB row under a fixed slot key. Saves go
//! through an upsert, so from the caller's perspective the write is atomic
//! and a half-written state is never observable.

use async_trait::async_trait;
use sqlx::PgPool;

use fabula_core::error::CheckpointError;
use fabula_core::job::AnimationJob;
use fabula_core::ports::CheckpointStore;

/// Well-known slot under which the animation pipeline keeps its job state.
pub const CHECKPOINT_SLOT: &str = "animation";

/// `CheckpointStore` backed by the `animation_checkpoints` table.
#[derive(Clone)]
pub struct PgCheckpointStore {
    pool: PgPool,
}

impl PgCheckpointStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CheckpointStore for PgCheckpointStore {
    async fn get(&self) -> Result<Option<AnimationJob>, CheckpointError> {
        let row: Option<(serde_json::Value,)> =
            sqlx::query_as("SELECT state FROM animation_checkpoints WHERE slot = $1")
                .bind(CHECKPOINT_SLOT)
                .fetch_optional(&self.pool)
                .await
                .map_err(unavailable)?;

        match row {
            None => Ok(None),
            Some((state,)) => serde_json::from_value(state)
                .map(Some)
                .map_err(|e| CheckpointError::Corrupt(e.to_string())),
        }
    }

    async fn save(&self, job: &AnimationJob) -> Result<(), CheckpointError> {
        let state =
            serde_json::to_value(job).map_err(|e| CheckpointError::Corrupt(e.to_string()))?;

        sqlx::query(
            "INSERT INTO animation_checkpoints (slot, state) VALUES ($1, $2) \
             ON CONFLICT (slot) DO UPDATE SET \
                 state = EXCLUDED.state, \
                 updated_at = NOW()",
        )
        .bind(CHECKPOINT_SLOT)
        .bind(state)
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(())
    }

    async fn clear(&self) -> Result<(), CheckpointError> {
        sqlx::query("DELETE FROM animation_checkpoints WHERE slot = $1")
            .bind(CHECKPOINT_SLOT)
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;

        Ok(())
    }
}

fn unavailable(err: sqlx::Error) -> CheckpointError {
    CheckpointError::Unavailable(err.to_string())
}
