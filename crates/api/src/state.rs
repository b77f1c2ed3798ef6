use std::sync::Arc;

use fabula_pipeline::engine::AnimationPipeline;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is a pool handle
/// that clones by reference count).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool. Handlers go through the pipeline; only the
    /// health endpoint touches the pool directly.
    pub pool: fabula_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The animation pipeline all job endpoints drive.
    pub pipeline: Arc<AnimationPipeline>,
}
