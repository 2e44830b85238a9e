//! API Routes
//!
//! Configures the Axum router with all studio endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    batch_handler, clear_handler, delete_handler, errors_handler, generate_handler, health_handler,
    quote_handler, session_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /generate` - Full generation in one style
/// - `POST /generate/batch` - One artwork per style
/// - `GET /quote?topic=` - Memoized quote lookup
/// - `GET /stats` - Cache statistics and error counts
/// - `GET /errors` - Recent absorbed failures
/// - `GET /sessions/:id` - Session summary
/// - `DELETE /cache` - Clear the cache
/// - `DELETE /cache/:key` - Delete one key
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/generate", post(generate_handler))
        .route("/generate/batch", post(batch_handler))
        .route("/quote", get(quote_handler))
        .route("/stats", get(stats_handler))
        .route("/errors", get(errors_handler))
        .route("/sessions/:id", get(session_handler))
        .route("/cache", delete(clear_handler))
        .route("/cache/:key", delete(delete_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
