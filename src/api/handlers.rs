//! API Handlers
//!
//! HTTP request handlers for each studio endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::info;

use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::{
    provenance_map, BatchRequest, BatchResponse, ClearResponse, DeleteResponse, ErrorsResponse,
    GenerateRequest, GenerateResponse, HealthResponse, QuoteQuery, QuoteResponse, StatsResponse,
};
use crate::session::{SessionRegistry, SessionSnapshot, DEFAULT_SESSION};
use crate::sources::Style;
use crate::studio::Studio;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub studio: Arc<Studio>,
    pub sessions: SessionRegistry,
    /// Style used when a request names none
    pub default_style: Style,
}

impl AppState {
    pub fn new(studio: Studio, default_style: Style) -> Self {
        Self {
            studio: Arc::new(studio),
            sessions: SessionRegistry::new(),
            default_style,
        }
    }

    /// Builds the studio and its collaborators from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(Studio::from_config(config), config.default_style)
    }
}

/// Handler for POST /generate
pub async fn generate_handler(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let style = req.style_or(state.default_style);
    let request = req.to_generation();
    let session = req.session.as_deref().unwrap_or(DEFAULT_SESSION);
    let mut context = state.sessions.begin(session, &request.topic);

    let generation = state.studio.generate(&mut context, &request, style).await;
    let response = GenerateResponse::new(&context, &generation);

    info!(session, stages = ?provenance_map(context.stages()), "served generation");
    state.sessions.complete(context);

    Ok(Json(response))
}

/// Handler for POST /generate/batch
pub async fn batch_handler(
    State(state): State<AppState>,
    Json(req): Json<BatchRequest>,
) -> Result<Json<BatchResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let request = req.to_generation();
    let session = req.session.as_deref().unwrap_or(DEFAULT_SESSION);
    let mut context = state.sessions.begin(session, &request.topic);

    let batch = state.studio.generate_batch(&mut context, &request).await;
    let response = BatchResponse::new(&context, &batch);

    info!(session, stages = ?provenance_map(context.stages()), "served batch");
    state.sessions.complete(context);

    Ok(Json(response))
}

/// Handler for GET /quote?topic=
pub async fn quote_handler(
    State(state): State<AppState>,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<QuoteResponse>> {
    if let Some(error_msg) = query.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let topic = query.topic.trim();
    let quote = state.studio.quote(topic).await;
    Ok(Json(QuoteResponse::new(topic, quote)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.studio.cache().stats().await;
    let errors = state.studio.errors().counts();
    Json(StatsResponse::new(cache, errors))
}

/// Handler for GET /errors
pub async fn errors_handler(State(state): State<AppState>) -> Json<ErrorsResponse> {
    let errors = state.studio.errors();
    Json(ErrorsResponse {
        counts: errors.counts(),
        recent: errors.recent(),
    })
}

/// Handler for GET /sessions/:id
pub async fn session_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>> {
    state
        .sessions
        .snapshot(&id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("session '{}'", id)))
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let cleared = state.studio.cache().clear().await;
    info!(cleared, "cache cleared");
    Json(ClearResponse::new(cleared))
}

/// Handler for DELETE /cache/:key
///
/// Idempotent: deleting a key that is not held still succeeds.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<DeleteResponse> {
    let deleted = state.studio.cache().delete(&key).await;
    Json(DeleteResponse::new(key, deleted))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
