//! Configuration Module
//!
//! Loads studio configuration from environment variables. Credentials are
//! required; everything else has a default.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::sources::Style;

/// Studio configuration parameters.
#[derive(Debug, Clone)]
pub struct Config {
    /// API key for the language model endpoint
    pub groq_api_key: String,
    /// Chat model name
    pub groq_model: String,
    /// Base URL of the OpenAI-compatible endpoint
    pub groq_base_url: String,
    /// Base URL of the quote API
    pub quote_api_url: String,
    /// Unsplash access key; Picsum is used when absent
    pub unsplash_access_key: Option<String>,
    pub unsplash_api_url: String,
    pub picsum_url: String,
    /// Maximum number of cache entries
    pub cache_max_entries: usize,
    /// Freshness window of cached results
    pub cache_ttl: Duration,
    /// Bound on quote and image calls
    pub http_timeout: Duration,
    /// Bound on language model calls
    pub ai_timeout: Duration,
    /// HTTP server port
    pub server_port: u16,
    /// Edge of the square still, in pixels
    pub canvas_size: u32,
    /// Edge of the square animation, in pixels
    pub animation_size: u32,
    pub animation_frames: u32,
    pub animation_frame_ms: u32,
    /// Style used when a request names none
    pub default_style: Style,
}

impl Config {
    /// Loads configuration from the process environment.
    ///
    /// # Environment Variables
    /// - `GROQ_API_KEY` - required
    /// - `GROQ_MODEL` (default: llama-3.1-8b-instant)
    /// - `GROQ_BASE_URL` (default: https://api.groq.com/openai/v1)
    /// - `QUOTE_API_URL` (default: https://api.quotable.io)
    /// - `UNSPLASH_ACCESS_KEY` (optional), `UNSPLASH_API_URL`, `PICSUM_URL`
    /// - `CACHE_MAX_ENTRIES` (default: 256), `CACHE_TTL_SECS` (default: 3600)
    /// - `HTTP_TIMEOUT_SECS` (default: 15), `AI_TIMEOUT_SECS` (default: 30)
    /// - `SERVER_PORT` (default: 3000)
    /// - `CANVAS_SIZE` (default: 1080), `ANIMATION_SIZE` (default: 360)
    /// - `ANIMATION_FRAMES` (default: 12), `ANIMATION_FRAME_MS` (default: 83)
    /// - `DEFAULT_STYLE` (default: midnight-aura)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let groq_api_key = var("GROQ_API_KEY").ok_or(ConfigError::Missing("GROQ_API_KEY"))?;

        Ok(Self {
            groq_api_key,
            groq_model: var("GROQ_MODEL").unwrap_or(defaults.groq_model),
            groq_base_url: var("GROQ_BASE_URL").unwrap_or(defaults.groq_base_url),
            quote_api_url: var("QUOTE_API_URL").unwrap_or(defaults.quote_api_url),
            unsplash_access_key: var("UNSPLASH_ACCESS_KEY"),
            unsplash_api_url: var("UNSPLASH_API_URL").unwrap_or(defaults.unsplash_api_url),
            picsum_url: var("PICSUM_URL").unwrap_or(defaults.picsum_url),
            cache_max_entries: positive("CACHE_MAX_ENTRIES", var("CACHE_MAX_ENTRIES"), defaults.cache_max_entries)?,
            cache_ttl: secs("CACHE_TTL_SECS", var("CACHE_TTL_SECS"), defaults.cache_ttl)?,
            http_timeout: secs("HTTP_TIMEOUT_SECS", var("HTTP_TIMEOUT_SECS"), defaults.http_timeout)?,
            ai_timeout: secs("AI_TIMEOUT_SECS", var("AI_TIMEOUT_SECS"), defaults.ai_timeout)?,
            server_port: parsed("SERVER_PORT", var("SERVER_PORT"), defaults.server_port)?,
            canvas_size: positive("CANVAS_SIZE", var("CANVAS_SIZE"), defaults.canvas_size)?,
            animation_size: positive("ANIMATION_SIZE", var("ANIMATION_SIZE"), defaults.animation_size)?,
            animation_frames: positive("ANIMATION_FRAMES", var("ANIMATION_FRAMES"), defaults.animation_frames)?,
            animation_frame_ms: positive("ANIMATION_FRAME_MS", var("ANIMATION_FRAME_MS"), defaults.animation_frame_ms)?,
            default_style: parsed("DEFAULT_STYLE", var("DEFAULT_STYLE"), defaults.default_style)?,
        })
    }
}

impl Default for Config {
    /// Defaults for every setting; the API key is left empty.
    fn default() -> Self {
        Self {
            groq_api_key: String::new(),
            groq_model: "llama-3.1-8b-instant".to_string(),
            groq_base_url: "https://api.groq.com/openai/v1".to_string(),
            quote_api_url: "https://api.quotable.io".to_string(),
            unsplash_access_key: None,
            unsplash_api_url: "https://api.unsplash.com".to_string(),
            picsum_url: "https://picsum.photos".to_string(),
            cache_max_entries: 256,
            cache_ttl: Duration::from_secs(3600),
            http_timeout: Duration::from_secs(15),
            ai_timeout: Duration::from_secs(30),
            server_port: 3000,
            canvas_size: 1080,
            animation_size: 360,
            animation_frames: 12,
            animation_frame_ms: 83,
            default_style: Style::MidnightAura,
        }
    }
}

// == Parsing Helpers ==
fn parsed<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|err: T::Err| ConfigError::Invalid {
            name,
            reason: err.to_string(),
            value,
        }),
    }
}

fn positive<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default,
    T::Err: std::fmt::Display,
{
    let Some(raw) = raw else {
        return Ok(default);
    };
    let value = parsed(name, Some(raw.clone()), default)?;
    if value <= T::default() {
        return Err(ConfigError::Invalid {
            name,
            value: raw,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}

fn secs(name: &'static str, raw: Option<String>, default: Duration) -> Result<Duration, ConfigError> {
    positive(name, raw, default.as_secs()).map(Duration::from_secs)
}
