//! Quote Studio - A quote content-generation service
//!
//! Fetches a quote, drafts social copy with a language model, fetches a
//! background and renders styled artwork. Every expensive step is memoized in
//! one in-memory cache with TTL expiration and LRU eviction.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod events;
pub mod keys;
pub mod models;
pub mod producers;
pub mod session;
pub mod sources;
pub mod studio;

pub use api::{create_router, AppState};
pub use config::Config;
pub use studio::{Collaborators, Studio};
