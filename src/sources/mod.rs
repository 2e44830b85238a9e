//! External Collaborators
//!
//! Traits for the expensive operations the producers memoize, the data they
//! exchange, and the default implementations the server ships with.

mod groq;
mod images;
mod quotable;
mod renderer;
mod style;

use std::sync::Arc;

use async_trait::async_trait;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::error::ProducerError;

pub use groq::GroqClient;
pub use images::{PicsumClient, UnsplashClient};
pub use quotable::QuotableClient;
pub use renderer::{CardRenderer, RenderSettings};
pub use style::{Palette, Style, UnknownStyle};

// == Data ==
/// A quote as returned by the quote source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub content: String,
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Inputs of one social-copy generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyRequest {
    pub quote: String,
    pub author: String,
    pub topic: String,
}

/// Inputs of one artwork render.
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub quote: String,
    pub author: String,
    /// Style tag; renderers reject tags they do not know
    pub style: String,
    pub background: Arc<RgbaImage>,
}

/// The three outputs of a render.
#[derive(Debug, Clone)]
pub struct RenderedArtwork {
    /// Square still
    pub still: RgbaImage,
    /// 9:16 story crop
    pub story: RgbaImage,
    /// Encoded looping GIF
    pub animation_gif: Vec<u8>,
}

// == Collaborator Traits ==
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetches a quote, restricted to `tag` when given.
    async fn fetch_quote(&self, tag: Option<&str>) -> Result<Quote, ProducerError>;
}

#[async_trait]
pub trait CopyGenerator: Send + Sync {
    /// Returns the raw model output, expected to be a JSON object.
    async fn generate_copy(&self, request: &CopyRequest) -> Result<String, ProducerError>;
}

#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Returns encoded image bytes for the keywords at the given size.
    async fn fetch_image(
        &self,
        keywords: &[String],
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, ProducerError>;
}

/// CPU-bound; callers run it on the blocking pool.
pub trait ImageRenderer: Send + Sync {
    fn render(&self, job: &RenderJob) -> Result<RenderedArtwork, ProducerError>;
}

/// Rejects responses outside 2xx with an upstream error naming the service.
pub(crate) fn check_status(
    service: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ProducerError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ProducerError::Upstream(format!("{service} returned {status}")))
    }
}
