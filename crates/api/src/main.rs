use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fabula_api::config::ServerConfig;
use fabula_api::router::build_app_router;
use fabula_api::state::AppState;
use fabula_assets::PgAssetLocator;
use fabula_db::checkpoint::PgCheckpointStore;
use fabula_kling::client::KlingClient;
use fabula_kling::config::KlingConfig;
use fabula_pipeline::config::PipelineConfig;
use fabula_pipeline::engine::AnimationPipeline;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "fabula_api=debug,fabula_pipeline=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Server configuration loaded");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = fabula_db::create_pool(&database_url)
        .await
        .expect("Could not connect to the database");
    tracing::info!("Database pool ready");

    fabula_db::health_check(&pool)
        .await
        .expect("Database probe query failed");
    tracing::info!("Database reachable");

    fabula_db::run_migrations(&pool)
        .await
        .expect("Could not apply database migrations");
    tracing::info!("Migrations applied");

    // --- Pipeline ---
    let store = Arc::new(PgCheckpointStore::new(pool.clone()));
    let assets = Arc::new(PgAssetLocator::new(pool.clone()));
    let animator = Arc::new(KlingClient::new(KlingConfig::from_env()));
    let pipeline = AnimationPipeline::new(store, assets, animator, PipelineConfig::from_env());
    tracing::info!("Animation pipeline ready");

    // --- App state + router ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        pipeline: Arc::clone(&pipeline),
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("HOST must be a valid IP address"),
        config.port,
    );
    tracing::info!(%addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Could not bind the listen address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, draining");

    // A timer tick may still be animating a scene; give it a bounded chance
    // to reach its checkpoint.
    let drained = tokio::time::timeout(
        Duration::from_secs(config.shutdown_timeout_secs),
        pipeline.shutdown(),
    )
    .await;
    if drained.is_err() {
        tracing::warn!("Pipeline step did not finish before the shutdown deadline");
    }

    tracing::info!("Shutdown complete");
}

/// Resolve when the process is told to stop.
///
/// Listens for SIGINT and, on Unix, SIGTERM, covering both an interactive
/// Ctrl-C and a stop issued by a process supervisor.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("SIGINT received, beginning graceful shutdown");
        }
        () = terminate => {
            tracing::info!("SIGTERM received, beginning graceful shutdown");
        }
    }
}
