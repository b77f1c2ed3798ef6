pub mod animation;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /animation/jobs            start a run (POST)
/// /animation/jobs/step       process one scene (POST)
/// /animation/jobs/current    inspect (GET), abandon (DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/animation", animation::router())
}
