//! Request DTOs for the studio API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

use crate::sources::{Quote, Style};
use crate::studio::GenerationRequest;

const MAX_TOPIC_LEN: usize = 200;
const MAX_QUOTE_LEN: usize = 500;
const MAX_SESSION_LEN: usize = 64;

/// Request body for POST /generate
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub topic: String,
    /// Style tag; the configured default when absent
    #[serde(default)]
    pub style: Option<String>,
    /// Own quote text, skipping the quote lookup
    #[serde(default)]
    pub quote: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub session: Option<String>,
}

impl GenerateRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if let Some(error) = validate_common(&self.topic, &self.quote, &self.author, &self.session) {
            return Some(error);
        }
        match &self.style {
            Some(style) => style.parse::<Style>().err().map(|err| err.to_string()),
            None => None,
        }
    }

    /// The requested style, or `default`. Call after `validate`.
    pub fn style_or(&self, default: Style) -> Style {
        self.style
            .as_deref()
            .and_then(|style| style.parse().ok())
            .unwrap_or(default)
    }

    pub fn to_generation(&self) -> GenerationRequest {
        generation_request(&self.topic, &self.quote, &self.author)
    }
}

/// Request body for POST /generate/batch
#[derive(Debug, Clone, Deserialize)]
pub struct BatchRequest {
    pub topic: String,
    #[serde(default)]
    pub quote: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub session: Option<String>,
}

impl BatchRequest {
    pub fn validate(&self) -> Option<String> {
        validate_common(&self.topic, &self.quote, &self.author, &self.session)
    }

    pub fn to_generation(&self) -> GenerationRequest {
        generation_request(&self.topic, &self.quote, &self.author)
    }
}

/// Query string of GET /quote
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteQuery {
    #[serde(default)]
    pub topic: String,
}

impl QuoteQuery {
    pub fn validate(&self) -> Option<String> {
        validate_topic(&self.topic)
    }
}

fn validate_topic(topic: &str) -> Option<String> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Some("Topic cannot be empty".to_string());
    }
    if topic.chars().count() > MAX_TOPIC_LEN {
        return Some(format!("Topic exceeds maximum length of {MAX_TOPIC_LEN} characters"));
    }
    None
}

fn validate_common(
    topic: &str,
    quote: &Option<String>,
    author: &Option<String>,
    session: &Option<String>,
) -> Option<String> {
    if let Some(error) = validate_topic(topic) {
        return Some(error);
    }

    let quote = quote.as_deref().map(str::trim);
    match quote {
        Some("") => return Some("Quote cannot be empty when given".to_string()),
        Some(text) if text.chars().count() > MAX_QUOTE_LEN => {
            return Some(format!("Quote exceeds maximum length of {MAX_QUOTE_LEN} characters"));
        }
        None if author.is_some() => return Some("Author requires a quote".to_string()),
        _ => {}
    }

    if let Some(session) = session {
        let valid = !session.is_empty()
            && session.len() <= MAX_SESSION_LEN
            && session
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Some(format!(
                "Session must be 1-{MAX_SESSION_LEN} characters of letters, digits, '-' or '_'"
            ));
        }
    }
    None
}

fn generation_request(topic: &str, quote: &Option<String>, author: &Option<String>) -> GenerationRequest {
    GenerationRequest {
        topic: topic.trim().to_string(),
        quote: quote.as_deref().map(|content| Quote {
            content: content.trim().to_string(),
            author: author
                .as_deref()
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .unwrap_or("Unknown")
                .to_string(),
            tags: Vec::new(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_deserialize() {
        let json = r#"{"topic": "hustle"}"#;
        let req: GenerateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.topic, "hustle");
        assert!(req.style.is_none());
        assert!(req.validate().is_none());
        assert_eq!(req.style_or(Style::KenyanForest), Style::KenyanForest);
    }

    #[test]
    fn test_validate_empty_topic() {
        let req: GenerateRequest = serde_json::from_str(r#"{"topic": "   "}"#).unwrap();
        assert!(req.validate().unwrap().contains("Topic"));
    }

    #[test]
    fn test_validate_unknown_style() {
        let req: GenerateRequest =
            serde_json::from_str(r#"{"topic": "x", "style": "watercolor"}"#).unwrap();
        assert!(req.validate().unwrap().contains("watercolor"));
    }

    #[test]
    fn test_validate_author_without_quote() {
        let req: BatchRequest = serde_json::from_str(r#"{"topic": "x", "author": "Me"}"#).unwrap();
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_session_charset() {
        let req: BatchRequest =
            serde_json::from_str(r#"{"topic": "x", "session": "../etc"}"#).unwrap();
        assert!(req.validate().is_some());

        let req: BatchRequest =
            serde_json::from_str(r#"{"topic": "x", "session": "user_42-a"}"#).unwrap();
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_provided_quote_defaults_author() {
        let req: GenerateRequest =
            serde_json::from_str(r#"{"topic": " grit ", "quote": " Keep going. ", "style": "Cyber Hustle"}"#)
                .unwrap();
        assert!(req.validate().is_none());
        assert_eq!(req.style_or(Style::MidnightAura), Style::CyberHustle);

        let generation = req.to_generation();
        assert_eq!(generation.topic, "grit");
        let quote = generation.quote.unwrap();
        assert_eq!(quote.content, "Keep going.");
        assert_eq!(quote.author, "Unknown");
    }

    #[test]
    fn test_quote_query_requires_topic() {
        let query: QuoteQuery = serde_json::from_str("{}").unwrap();
        assert!(query.validate().is_some());
    }
}
