//! mechdeck: HTTP API for the story and reward engine.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod session;
pub mod state;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the full application router.
// TODO: Replace CorsLayer::permissive() with restricted origins for production.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/stories", routes::stories::router())
        .nest("/api/v1/players", routes::players::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
