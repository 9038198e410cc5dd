//! API module
//!
//! HTTP API endpoints and middleware.

pub mod middleware;
pub mod routes;


use std::time::Duration;

use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use routes::{create_router, AppState};

/// Build the full application router
pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    // Note: Axum layers are applied in reverse order (last added = first executed)
    // Order: trace -> logging -> timeout -> handler
    // A timed-out handler is dropped, which rolls back any open transaction.
    let api_routes = create_router()
        .layer(TimeoutLayer::new(request_timeout))
        .layer(axum::middleware::from_fn(middleware::logging_middleware));

    Router::new()
        // Health check
        .route("/health", axum::routing::get(health_check))
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
