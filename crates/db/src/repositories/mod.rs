//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod scene_artifact_repo;
pub mod scene_input_repo;

pub use scene_artifact_repo::SceneArtifactRepo;
pub use scene_input_repo::SceneInputRepo;
