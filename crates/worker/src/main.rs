//! Headless drain tool: resumes the checkpointed animation job and steps
//! it to a terminal state.
//!
//! Connects to the same database and remote service as the API server but
//! runs without it, which makes it the way to finish a stuck job from a
//! shell. Exits immediately when no checkpoint exists; otherwise it calls
//! `run_next` once per iteration until the job is terminal or a job-level
//! error ends the drain (the checkpoint keeps the position either way).

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fabula_assets::PgAssetLocator;
use fabula_db::checkpoint::PgCheckpointStore;
use fabula_kling::client::KlingClient;
use fabula_kling::config::KlingConfig;
use fabula_pipeline::config::PipelineConfig;
use fabula_pipeline::engine::AnimationPipeline;

/// Pause between consecutive drained steps.
const STEP_PAUSE: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fabula_worker=debug,fabula_pipeline=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = fabula_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    fabula_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database ready");

    let store = Arc::new(PgCheckpointStore::new(pool.clone()));
    let assets = Arc::new(PgAssetLocator::new(pool.clone()));
    let animator = Arc::new(KlingClient::new(KlingConfig::from_env()));
    let pipeline = AnimationPipeline::new(store, assets, animator, PipelineConfig::from_env());

    let Some(job) = pipeline
        .status()
        .await
        .context("Failed to load the job checkpoint")?
    else {
        tracing::info!("No job checkpoint; nothing to drain");
        return Ok(());
    };
    tracing::info!(
        story_id = %job.story_id,
        language = %job.language,
        cursor = job.cursor,
        total_scenes = job.total_scenes,
        "Resuming checkpointed job"
    );

    loop {
        let outcome = pipeline
            .run_next()
            .await
            .context("Job-level failure ended the drain")?;
        tracing::info!(?outcome, "Step finished");
        if outcome.is_terminal() {
            break;
        }
        tokio::time::sleep(STEP_PAUSE).await;
    }

    tracing::info!("Drain complete");
    Ok(())
}
