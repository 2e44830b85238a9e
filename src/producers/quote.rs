//! Memoized quote lookup.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::{bounded, MemoContext, Memoized, ProducerKind};
use crate::cache::CachedValue;
use crate::error::ProducerError;
use crate::keys::{normalize_text, quote_key, CacheKey};
use crate::sources::{Quote, QuoteSource};

const MAX_TAG_VARIANTS: usize = 3;

/// Served when the quote source cannot answer.
pub const FALLBACK_QUOTES: [(&str, &str); 5] = [
    ("The secret of getting ahead is getting started.", "Mark Twain"),
    ("It always seems impossible until it's done.", "Nelson Mandela"),
    ("Well done is better than well said.", "Benjamin Franklin"),
    ("Act as if what you do makes a difference. It does.", "William James"),
    ("Quality is not an act, it is a habit.", "Aristotle"),
];

/// Picks one of the fixed quotes by key, so a topic always gets the same one.
pub fn fallback_quote(key: &CacheKey) -> Quote {
    let index = u64::from_str_radix(&key.as_str()[..8], 16).unwrap_or(0) as usize
        % FALLBACK_QUOTES.len();
    let (content, author) = FALLBACK_QUOTES[index];
    Quote {
        content: content.to_string(),
        author: author.to_string(),
        tags: Vec::new(),
    }
}

/// Tags tried in order: the slugged topic, then its words, at most three.
pub fn tag_variants(topic: &str) -> Vec<String> {
    let normalized = normalize_text(topic);
    let words: Vec<&str> = normalized.split(' ').filter(|w| !w.is_empty()).collect();
    if words.is_empty() {
        return Vec::new();
    }

    let mut variants = vec![words.join("-")];
    for word in words {
        if variants.len() == MAX_TAG_VARIANTS {
            break;
        }
        if !variants.iter().any(|v| v == word) {
            variants.push(word.to_string());
        }
    }
    variants
}

#[derive(Clone)]
pub struct QuoteProducer {
    source: Arc<dyn QuoteSource>,
    memo: MemoContext,
    timeout: Duration,
}

impl QuoteProducer {
    pub fn new(source: Arc<dyn QuoteSource>, memo: MemoContext, timeout: Duration) -> Self {
        Self {
            source,
            memo,
            timeout,
        }
    }

    pub async fn quote(&self, topic: &str) -> Memoized<Quote> {
        let key = quote_key(topic);
        let context = normalize_text(topic);

        self.memo
            .memoize(
                ProducerKind::Quote,
                &key,
                &context,
                |stored| {
                    let value = stored.as_json()?.clone();
                    serde_json::from_value::<Quote>(value).ok()
                },
                || async {
                    let quote = self.lookup(topic).await?;
                    let encoded = serde_json::to_value(&quote)
                        .map_err(|err| ProducerError::Upstream(err.to_string()))?;
                    Ok::<_, ProducerError>((quote, CachedValue::Json(encoded)))
                },
                || fallback_quote(&key),
            )
            .await
    }

    /// Tagged attempts first, then one untagged query. A timeout ends the
    /// search at once.
    async fn lookup(&self, topic: &str) -> Result<Quote, ProducerError> {
        let attempts = tag_variants(topic).into_iter().map(Some).chain([None]);

        let mut last_error = None;
        for tag in attempts {
            let call = self.source.fetch_quote(tag.as_deref());
            match bounded(self.timeout, "quote source", call).await {
                Ok(quote) => return Ok(quote),
                Err(err @ ProducerError::NetworkTimeout(_)) => return Err(err),
                Err(err) => {
                    debug!(?tag, error = %err, "quote attempt failed");
                    last_error = Some(err);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| ProducerError::Upstream("no quote attempts made".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::SharedCache;
    use crate::events::ErrorLog;
    use crate::producers::Provenance;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Answers only for the listed tags and records every call.
    struct ScriptedSource {
        known: Vec<Option<&'static str>>,
        delay: Option<Duration>,
        calls: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedSource {
        fn new(known: Vec<Option<&'static str>>) -> Self {
            Self {
                known,
                delay: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Option<String>> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl QuoteSource for ScriptedSource {
        async fn fetch_quote(&self, tag: Option<&str>) -> Result<Quote, ProducerError> {
            self.calls.lock().push(tag.map(str::to_string));
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.known.iter().any(|known| *known == tag) {
                Ok(Quote {
                    content: format!("quote for {tag:?}"),
                    author: "Tester".into(),
                    tags: tag.map(|t| vec![t.to_string()]).unwrap_or_default(),
                })
            } else {
                Err(ProducerError::Upstream(format!("no quote tagged {tag:?}")))
            }
        }
    }

    fn producer(source: Arc<ScriptedSource>, timeout: Duration) -> (QuoteProducer, MemoContext) {
        let memo = MemoContext::new(SharedCache::new(16, Duration::from_secs(3600)), ErrorLog::new());
        (QuoteProducer::new(source, memo.clone(), timeout), memo)
    }

    #[test]
    fn test_tag_variants() {
        assert_eq!(tag_variants("  Deep   Work "), vec!["deep-work", "deep", "work"]);
        assert_eq!(tag_variants("hustle"), vec!["hustle"]);
        assert_eq!(tag_variants("a b c d"), vec!["a-b-c-d", "a", "b"]);
        assert!(tag_variants("   ").is_empty());
    }

    #[test]
    fn test_fallback_is_stable_per_topic() {
        let a = fallback_quote(&quote_key("hustle"));
        let b = fallback_quote(&quote_key("  HUSTLE "));
        assert_eq!(a, b);
        assert!(FALLBACK_QUOTES.iter().any(|(content, _)| *content == a.content));
    }

    #[tokio::test]
    async fn test_live_then_cached() {
        let source = Arc::new(ScriptedSource::new(vec![Some("hustle")]));
        let (producer, memo) = producer(source.clone(), Duration::from_secs(1));

        let first = producer.quote("hustle").await;
        assert_eq!(first.provenance, Provenance::Live);
        let second = producer.quote("Hustle").await;
        assert!(second.is_cached());
        assert_eq!(first.value, second.value);

        assert_eq!(source.calls().len(), 1);
        assert_eq!(memo.cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_retries_words_then_untagged() {
        let source = Arc::new(ScriptedSource::new(vec![None]));
        let (producer, _) = producer(source.clone(), Duration::from_secs(1));

        let result = producer.quote("deep work").await;

        assert!(!result.is_fallback());
        assert_eq!(
            source.calls(),
            vec![
                Some("deep-work".to_string()),
                Some("deep".to_string()),
                Some("work".to_string()),
                None
            ]
        );
    }

    #[tokio::test]
    async fn test_timeout_serves_fallback_without_caching() {
        let mut source = ScriptedSource::new(vec![Some("hustle"), None]);
        source.delay = Some(Duration::from_millis(200));
        let source = Arc::new(source);
        let (producer, memo) = producer(source.clone(), Duration::from_millis(20));

        let result = producer.quote("hustle").await;

        assert!(result.is_fallback());
        assert!(FALLBACK_QUOTES
            .iter()
            .any(|(content, author)| *content == result.value.content && *author == result.value.author));

        // The timeout stopped the retries
        assert_eq!(source.calls().len(), 1);

        let stats = memo.cache.stats().await;
        assert_eq!(stats.size, 0);
        assert_eq!(stats.misses, 1);
        assert_eq!(memo.errors.counts().network_timeout, 1);
    }

    #[tokio::test]
    async fn test_all_attempts_failing_is_fallback() {
        let source = Arc::new(ScriptedSource::new(vec![]));
        let (producer, memo) = producer(source.clone(), Duration::from_secs(1));

        let result = producer.quote("zen").await;

        assert!(result.is_fallback());
        assert_eq!(source.calls().len(), 2);
        assert_eq!(memo.errors.counts().upstream_error, 1);

        // Nothing cached, so the next call asks again
        producer.quote("zen").await;
        assert_eq!(source.calls().len(), 4);
    }
}
