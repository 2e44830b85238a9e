//! Memoized social-copy generation.
//!
//! Model output is validated against [`SocialCopy`] as soon as it arrives;
//! only validated copy reaches the cache.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{bounded, MemoContext, Memoized, ProducerKind};
use crate::cache::CachedValue;
use crate::error::ProducerError;
use crate::keys::{copy_key, normalize_text};
use crate::sources::{CopyGenerator, CopyRequest, Quote};

const FALLBACK_TAGS: [&str; 3] = ["#quotes", "#motivation", "#dailyinspiration"];

/// Social copy accompanying one quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialCopy {
    pub caption: String,
    pub hashtags: Vec<String>,
    pub background_keywords: Vec<String>,
    #[serde(default)]
    pub visual_style: String,
    #[serde(default)]
    pub audio_suggestion: String,
    #[serde(default)]
    pub call_to_action: String,
    #[serde(default)]
    pub posting_time_suggestion: String,
}

impl SocialCopy {
    /// Parses and validates raw model output.
    ///
    /// Text around the outermost JSON object is ignored. Hashtags are trimmed
    /// and `#`-prefixed; blank hashtags and keywords are dropped.
    pub fn parse(raw: &str) -> Result<Self, ProducerError> {
        let start = raw.find('{');
        let end = raw.rfind('}');
        let body = match (start, end) {
            (Some(start), Some(end)) if start < end => &raw[start..=end],
            _ => return Err(ProducerError::Upstream("copy is not a JSON object".to_string())),
        };

        let mut copy: SocialCopy = serde_json::from_str(body)
            .map_err(|err| ProducerError::Upstream(format!("copy does not match schema: {err}")))?;

        copy.caption = copy.caption.trim().to_string();
        if copy.caption.is_empty() {
            return Err(ProducerError::Upstream("copy has an empty caption".to_string()));
        }

        copy.background_keywords = copy
            .background_keywords
            .iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        if copy.background_keywords.is_empty() {
            return Err(ProducerError::Upstream("copy has no background keywords".to_string()));
        }

        copy.hashtags = copy
            .hashtags
            .iter()
            .map(|tag| tag.trim().trim_start_matches('#').to_string())
            .filter(|tag| !tag.is_empty())
            .map(|tag| format!("#{tag}"))
            .collect();

        Ok(copy)
    }
}

/// Copy assembled from the inputs alone.
pub fn fallback_copy(quote: &str, author: &str, topic: &str) -> SocialCopy {
    let topic = normalize_text(topic);
    let words: Vec<&str> = topic.split(' ').filter(|w| !w.is_empty()).collect();

    let mut hashtags: Vec<String> = words.iter().map(|w| format!("#{w}")).collect();
    hashtags.extend(FALLBACK_TAGS.iter().map(|t| t.to_string()));

    let mut background_keywords: Vec<String> = words.iter().map(|w| w.to_string()).collect();
    background_keywords.push("minimal".to_string());

    SocialCopy {
        caption: format!("\"{quote}\" by {author}. Save this for the days you need a reminder."),
        hashtags,
        background_keywords,
        visual_style: "minimal".to_string(),
        audio_suggestion: "soft lo-fi instrumental".to_string(),
        call_to_action: "Share this with someone who needs it today.".to_string(),
        posting_time_suggestion: "Weekdays between 7 and 9 AM".to_string(),
    }
}

#[derive(Clone)]
pub struct CopyProducer {
    generator: Arc<dyn CopyGenerator>,
    memo: MemoContext,
    timeout: Duration,
}

impl CopyProducer {
    pub fn new(generator: Arc<dyn CopyGenerator>, memo: MemoContext, timeout: Duration) -> Self {
        Self {
            generator,
            memo,
            timeout,
        }
    }

    pub async fn copy(&self, quote: &Quote, topic: &str) -> Memoized<SocialCopy> {
        let key = copy_key(&quote.content, &quote.author, topic);
        let request = CopyRequest {
            quote: quote.content.clone(),
            author: quote.author.clone(),
            topic: normalize_text(topic),
        };

        self.memo
            .memoize(
                ProducerKind::Copy,
                &key,
                &request.topic,
                |stored| serde_json::from_value(stored.as_json()?.clone()).ok(),
                || async {
                    let raw =
                        bounded(self.timeout, "copy generator", self.generator.generate_copy(&request))
                            .await?;
                    let copy = SocialCopy::parse(&raw)?;
                    let encoded = serde_json::to_value(&copy)
                        .map_err(|err| ProducerError::Upstream(err.to_string()))?;
                    Ok::<_, ProducerError>((copy, CachedValue::Json(encoded)))
                },
                || fallback_copy(&quote.content, &quote.author, topic),
            )
            .await
    }
}
