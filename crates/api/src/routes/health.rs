//! Service liveness probe.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Payload of the liveness probe.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when a dependency is unreachable.
    pub status: &'static str,
    /// Version of the running binary.
    pub version: &'static str,
    /// Whether the checkpoint database answered a probe query.
    pub db_healthy: bool,
}

/// GET /health -- liveness plus a database reachability probe.
///
/// Reports `degraded` instead of failing the request when the database is
/// down: the process itself is alive, and the animation endpoints surface
/// their own storage errors.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = fabula_db::health_check(&state.pool).await.is_ok();

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
    })
}

/// Mount the probe at the root, outside the `/api/v1` prefix.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
