//! Memoized background image fetch.

use std::sync::Arc;
use std::time::Duration;

use image::{Rgba, RgbaImage};

use super::render::encode_png;
use super::{bounded, MemoContext, Memoized, ProducerKind};
use crate::cache::CachedValue;
use crate::error::ProducerError;
use crate::keys::{background_key, normalize_keywords};
use crate::sources::ImageSource;

const GRADIENT_TOP: [u8; 3] = [24, 28, 48];
const GRADIENT_BOTTOM: [u8; 3] = [86, 60, 110];

/// A decoded background plus the bytes it was decoded from.
#[derive(Debug, Clone)]
pub struct Background {
    pub image: Arc<RgbaImage>,
    /// Render keys hash these bytes
    pub encoded: Arc<[u8]>,
}

impl Background {
    /// Decodes image bytes; anything that is not an image is an upstream error.
    pub fn decode(encoded: Arc<[u8]>) -> Result<Self, ProducerError> {
        let image = image::load_from_memory(&encoded)
            .map_err(|err| ProducerError::Upstream(format!("background is not an image: {err}")))?
            .to_rgba8();
        Ok(Self {
            image: Arc::new(image),
            encoded,
        })
    }
}

/// Fixed vertical gradient at the requested size.
pub fn fallback_background(width: u32, height: u32) -> Background {
    let (width, height) = (width.max(1), height.max(1));
    let image = RgbaImage::from_fn(width, height, |_, y| {
        let t = y as f32 / (height - 1).max(1) as f32;
        let channel = |i: usize| {
            (GRADIENT_TOP[i] as f32 + (GRADIENT_BOTTOM[i] as f32 - GRADIENT_TOP[i] as f32) * t).round()
                as u8
        };
        Rgba([channel(0), channel(1), channel(2), 255])
    });
    let encoded = encode_png(&image).unwrap_or_else(|_| image.as_raw().clone());

    Background {
        image: Arc::new(image),
        encoded: encoded.into(),
    }
}

#[derive(Clone)]
pub struct BackgroundProducer {
    source: Arc<dyn ImageSource>,
    memo: MemoContext,
    timeout: Duration,
}

impl BackgroundProducer {
    pub fn new(source: Arc<dyn ImageSource>, memo: MemoContext, timeout: Duration) -> Self {
        Self {
            source,
            memo,
            timeout,
        }
    }

    pub async fn background(&self, keywords: &[String], width: u32, height: u32) -> Memoized<Background> {
        let keywords = normalize_keywords(keywords);
        let key = background_key(&keywords, width, height);
        let context = keywords.join(",");

        self.memo
            .memoize(
                ProducerKind::Background,
                &key,
                &context,
                |stored| Background::decode(stored.as_bytes()?.clone()).ok(),
                || async {
                    let call = self.source.fetch_image(&keywords, width, height);
                    let bytes = bounded(self.timeout, "image source", call).await?;
                    let background = Background::decode(bytes.into())?;
                    let encoded = CachedValue::Bytes(background.encoded.clone());
                    Ok::<_, ProducerError>((background, encoded))
                },
                || fallback_background(width, height),
            )
            .await
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

    struct FixedImages {
        bytes: Vec<u8>,
        requests: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl ImageSource for FixedImages {
        async fn fetch_image(
            &self,
            keywords: &[String],
            _width: u32,
            _height: u32,
        ) -> Result<Vec<u8>, ProducerError> {
            self.requests.lock().push(keywords.to_vec());
            Ok(self.bytes.clone())
        }
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        encode_png(&RgbaImage::from_pixel(width, height, Rgba([10, 200, 30, 255]))).unwrap()
    }

    fn producer(bytes: Vec<u8>) -> (BackgroundProducer, Arc<FixedImages>, MemoContext) {
        let source = Arc::new(FixedImages {
            bytes,
            requests: Mutex::new(Vec::new()),
        });
        let memo = MemoContext::new(SharedCache::new(16, Duration::from_secs(3600)), ErrorLog::new());
        let producer = BackgroundProducer::new(source.clone(), memo.clone(), Duration::from_secs(1));
        (producer, source, memo)
    }

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[tokio::test]
    async fn test_fetch_decodes_and_caches_bytes() {
        let (producer, source, memo) = producer(png(4, 3));

        let first = producer.background(&words(&["City ", "night"]), 4, 3).await;
        assert_eq!(first.provenance, Provenance::Live);
        assert_eq!(first.value.image.dimensions(), (4, 3));

        // Normalized keywords share the entry
        let second = producer.background(&words(&["city", "", "NIGHT"]), 4, 3).await;
        assert_eq!(second.provenance, Provenance::Cache);
        assert_eq!(second.value.encoded, first.value.encoded);

        assert_eq!(source.requests.lock().clone(), vec![words(&["city", "night"])]);
        assert_eq!(memo.cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_size_is_part_of_key() {
        let (producer, source, _) = producer(png(2, 2));
        producer.background(&words(&["sea"]), 2, 2).await;
        producer.background(&words(&["sea"]), 4, 4).await;
        assert_eq!(source.requests.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_garbage_bytes_fall_back() {
        let (producer, _, memo) = producer(b"<html>rate limited</html>".to_vec());

        let result = producer.background(&words(&["sea"]), 8, 6).await;

        assert!(result.is_fallback());
        assert_eq!(result.value.image.dimensions(), (8, 6));
        assert!(memo.cache.is_empty().await);
        assert_eq!(memo.errors.counts().upstream_error, 1);
    }

    #[test]
    fn test_fallback_gradient_is_deterministic() {
        let a = fallback_background(5, 10);
        let b = fallback_background(5, 10);
        assert_eq!(a.encoded, b.encoded);
        assert_eq!(a.image.get_pixel(0, 0).0[..3], GRADIENT_TOP);
        assert_eq!(a.image.get_pixel(4, 9).0[..3], GRADIENT_BOTTOM);
        assert!(Background::decode(a.encoded.clone()).is_ok());
    }
}
