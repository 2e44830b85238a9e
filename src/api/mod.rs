//! API Module
//!
//! HTTP handlers and routing for the studio REST API.
//!
//! # Endpoints
//! - `POST /generate`, `POST /generate/batch` - Run the pipeline
//! - `GET /quote?topic=` - Memoized quote lookup
//! - `GET /stats`, `GET /errors` - Cache and failure reporting
//! - `GET /sessions/:id` - Session summary
//! - `DELETE /cache`, `DELETE /cache/:key` - Cache maintenance
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
