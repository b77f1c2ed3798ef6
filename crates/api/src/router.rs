//! Application router assembly.
//!
//! [`build_app_router`] is the one place where the route tree meets the
//! middleware stack. The binary and the integration tests both call it, so
//! a request behaves identically under test and in production.

use std::time::Duration;

use axum::http::{HeaderName, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

/// Assemble the application [`Router`]: the health probe at the root, the
/// `/api/v1` tree, and the middleware stack.
///
/// Later `.layer` calls wrap earlier ones, so reading the chain bottom-up
/// gives the request's path inward: compression, request-id stamping,
/// tracing, request-id propagation, the request timeout, and panic
/// recovery closest to the handlers.
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let request_id_header = HeaderName::from_static("x-request-id");

    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        // A panicking handler answers 500 instead of dropping the
        // connection.
        .layer(CatchPanicLayer::new())
        // Bound every request; a stuck pipeline step must not pin a
        // connection forever.
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        // Copy the request id onto the response for log correlation...
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(trace)
        // ...after stamping incoming requests with a fresh UUID.
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(CompressionLayer::new())
        .with_state(state)
}
