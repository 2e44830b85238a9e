//! Response DTOs for the studio API
//!
//! Defines the structure of outgoing HTTP response bodies. Binary artwork is
//! base64 encoded.

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;

use crate::cache::StatsSnapshot;
use crate::events::{ErrorCounts, ErrorEvent};
use crate::producers::{Artwork, Memoized, Provenance, SocialCopy};
use crate::session::{GenerationContext, StageProvenance};
use crate::sources::{Quote, Style};
use crate::studio::{BatchGeneration, Generation};

/// Encoded artwork files
#[derive(Debug, Clone, Serialize)]
pub struct ArtworkBody {
    pub still_png: String,
    pub story_png: String,
    pub animation_gif: String,
}

impl From<&Artwork> for ArtworkBody {
    fn from(artwork: &Artwork) -> Self {
        Self {
            still_png: STANDARD.encode(&artwork.still_png),
            story_png: STANDARD.encode(&artwork.story_png),
            animation_gif: STANDARD.encode(&artwork.animation_gif),
        }
    }
}

/// Response body for POST /generate
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    pub session: String,
    pub generation: u64,
    pub topic: String,
    pub style: Style,
    pub quote: Quote,
    pub copy: SocialCopy,
    pub stages: Vec<StageProvenance>,
    pub artwork: ArtworkBody,
}

impl GenerateResponse {
    pub fn new(context: &GenerationContext, generation: &Generation) -> Self {
        Self {
            session: context.session_id().to_string(),
            generation: context.generation(),
            topic: context.topic().to_string(),
            style: generation.style,
            quote: generation.quote.clone(),
            copy: generation.copy.clone(),
            stages: context.stages().to_vec(),
            artwork: ArtworkBody::from(&generation.artwork),
        }
    }
}

/// One style of a batch
#[derive(Debug, Clone, Serialize)]
pub struct StyledArtwork {
    pub style: Style,
    pub provenance: Provenance,
    pub artwork: ArtworkBody,
}

impl StyledArtwork {
    fn new(style: Style, artwork: &Memoized<Artwork>) -> Self {
        Self {
            style,
            provenance: artwork.provenance,
            artwork: ArtworkBody::from(&artwork.value),
        }
    }
}

/// Response body for POST /generate/batch
#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    pub session: String,
    pub generation: u64,
    pub topic: String,
    pub quote: Quote,
    pub copy: SocialCopy,
    pub stages: Vec<StageProvenance>,
    pub artworks: Vec<StyledArtwork>,
}

impl BatchResponse {
    pub fn new(context: &GenerationContext, batch: &BatchGeneration) -> Self {
        Self {
            session: context.session_id().to_string(),
            generation: context.generation(),
            topic: context.topic().to_string(),
            quote: batch.quote.clone(),
            copy: batch.copy.clone(),
            stages: context.stages().to_vec(),
            artworks: batch
                .artworks
                .iter()
                .map(|(style, artwork)| StyledArtwork::new(*style, artwork))
                .collect(),
        }
    }
}

/// Response body for GET /quote
#[derive(Debug, Clone, Serialize)]
pub struct QuoteResponse {
    pub topic: String,
    pub content: String,
    pub author: String,
    pub tags: Vec<String>,
    pub provenance: Provenance,
}

impl QuoteResponse {
    pub fn new(topic: impl Into<String>, quote: Memoized<Quote>) -> Self {
        Self {
            topic: topic.into(),
            content: quote.value.content,
            author: quote.value.author,
            tags: quote.value.tags,
            provenance: quote.provenance,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub cache: StatsSnapshot,
    /// Hit rate formatted as a percentage, e.g. "75.0%"
    pub hit_rate_percent: String,
    pub errors: ErrorCounts,
}

impl StatsResponse {
    pub fn new(cache: StatsSnapshot, errors: ErrorCounts) -> Self {
        Self {
            hit_rate_percent: cache.hit_rate_percent(),
            cache,
            errors,
        }
    }
}

/// Response body for GET /errors
#[derive(Debug, Clone, Serialize)]
pub struct ErrorsResponse {
    pub counts: ErrorCounts,
    pub recent: Vec<ErrorEvent>,
}

/// Response body for DELETE /cache/:key
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub key: String,
    /// False when the key was not held
    pub deleted: bool,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>, deleted: bool) -> Self {
        let key = key.into();
        let message = if deleted {
            format!("Key '{}' deleted successfully", key)
        } else {
            format!("Key '{}' was not cached", key)
        };
        Self {
            message,
            key,
            deleted,
        }
    }
}

/// Response body for DELETE /cache
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
    /// Entries held before the clear
    pub cleared: usize,
}

impl ClearResponse {
    pub fn new(cleared: usize) -> Self {
        Self {
            message: format!("Cleared {} cached entries", cleared),
            cleared,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Provenance keyed by stage name, for compact logging.
pub fn provenance_map(stages: &[StageProvenance]) -> BTreeMap<String, Provenance> {
    stages
        .iter()
        .map(|s| {
            let name = match s.style {
                Some(style) => format!("{}:{}", s.stage.as_str(), style),
                None => s.stage.as_str().to_string(),
            };
            (name, s.provenance)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStats;
    use crate::producers::ProducerKind;

    #[test]
    fn test_artwork_body_is_base64() {
        let artwork = Artwork {
            still_png: b"png".to_vec(),
            story_png: vec![],
            animation_gif: b"GIF89a".to_vec(),
        };
        let body = ArtworkBody::from(&artwork);
        assert_eq!(body.still_png, "cG5n");
        assert_eq!(body.story_png, "");
        assert_eq!(body.animation_gif, "R0lGODlh");
    }

    #[test]
    fn test_stats_response_flattens_snapshot() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        let resp = StatsResponse::new(StatsSnapshot::new(stats, 2, 10, 3600), ErrorCounts::default());

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["hits"], 3);
        assert_eq!(json["size"], 2);
        assert_eq!(json["hit_rate_percent"], "75.0%");
        assert_eq!(json["errors"]["network_timeout"], 0);
    }

    #[test]
    fn test_delete_response_messages() {
        assert!(DeleteResponse::new("k", true).message.contains("deleted"));
        assert!(DeleteResponse::new("k", false).message.contains("not cached"));
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_provenance_map_names_styles() {
        let stages = vec![
            StageProvenance {
                stage: ProducerKind::Quote,
                style: None,
                provenance: Provenance::Cache,
            },
            StageProvenance {
                stage: ProducerKind::Render,
                style: Some(Style::CyberHustle),
                provenance: Provenance::Fallback,
            },
        ];
        let map = provenance_map(&stages);
        assert_eq!(map["quote"], Provenance::Cache);
        assert_eq!(map["render:cyber-hustle"], Provenance::Fallback);
    }
}
