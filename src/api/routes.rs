//! API Routes
//!
//! Configures the Axum router with all content gateway endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{content_handler, health_handler, stats_handler, AppState};

/// Creates the gateway router with all endpoints configured.
///
/// # Endpoints
/// - `POST /api/ai` - Generate (or fetch cached) educational content
/// - `GET /api/health` - Health check endpoint
/// - `GET /api/stats` - Cache statistics
///
/// # Middleware
/// - CORS: Allows any origin, answers preflight requests
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/ai", post(content_handler))
        .route("/api/health", get(health_handler))
        .route("/api/stats", get(stats_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
