//! Request and Response models for the studio API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{BatchRequest, GenerateRequest, QuoteQuery};
pub use responses::{
    provenance_map, ArtworkBody, BatchResponse, ClearResponse, DeleteResponse, ErrorsResponse,
    GenerateResponse, HealthResponse, QuoteResponse, StatsResponse, StyledArtwork,
};
