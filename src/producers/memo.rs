//! Cache-check, compute-on-miss, store-on-success.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::{Memoized, ProducerKind, Provenance};
use crate::cache::{CachedValue, SharedCache};
use crate::error::ProducerError;
use crate::events::ErrorLog;
use crate::keys::CacheKey;

/// What every producer needs to memoize one call.
#[derive(Debug, Clone)]
pub struct MemoContext {
    pub cache: SharedCache,
    pub errors: ErrorLog,
}

impl MemoContext {
    pub fn new(cache: SharedCache, errors: ErrorLog) -> Self {
        Self { cache, errors }
    }

    /// Runs one memoized call.
    ///
    /// `decode` turns a stored encoding back into the value; an entry it
    /// rejects is deleted and the call proceeds as a miss. `compute` returns
    /// the value together with its encoding, and only that encoding is ever
    /// written. On failure the error is recorded, nothing is written and
    /// `fallback` provides the value.
    pub async fn memoize<T, D, C, Fut, F>(
        &self,
        producer: ProducerKind,
        key: &CacheKey,
        context: &str,
        decode: D,
        compute: C,
        fallback: F,
    ) -> Memoized<T>
    where
        D: FnOnce(&CachedValue) -> Option<T>,
        C: FnOnce() -> Fut,
        Fut: Future<Output = Result<(T, CachedValue), ProducerError>>,
        F: FnOnce() -> T,
    {
        if let Some(stored) = self.cache.get(key).await {
            let kind = stored.kind();
            match decode(&stored) {
                Some(value) => {
                    debug!(producer = producer.as_str(), key = key.short(), "cache hit");
                    return Memoized::new(value, Provenance::Cache);
                }
                None => {
                    warn!(
                        producer = producer.as_str(),
                        key = key.short(),
                        kind,
                        "dropping undecodable cache entry"
                    );
                    self.cache.delete(key.as_str()).await;
                }
            }
        } else {
            debug!(producer = producer.as_str(), key = key.short(), "cache miss");
        }

        match compute().await {
            Ok((value, encoded)) => {
                let size = encoded.size_bytes();
                self.cache.set(key, encoded).await;
                info!(producer = producer.as_str(), key = key.short(), size, "stored result");
                Memoized::new(value, Provenance::Live)
            }
            Err(err) => {
                self.errors.record(producer, &err, context);
                Memoized::new(fallback(), Provenance::Fallback)
            }
        }
    }
}

/// Bounds an external call; running out of time is a `NetworkTimeout`.
pub async fn bounded<T, Fut>(limit: Duration, what: &str, call: Fut) -> Result<T, ProducerError>
where
    Fut: Future<Output = Result<T, ProducerError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(ProducerError::NetworkTimeout(format!(
            "{what} did not answer within {}ms",
            limit.as_millis()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{KeyBuilder, KeyKind};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Notify;

    fn context() -> MemoContext {
        MemoContext::new(SharedCache::new(8, Duration::from_secs(60)), ErrorLog::new())
    }

    fn key(name: &str) -> CacheKey {
        KeyBuilder::new(KeyKind::Quote).text(name).finish()
    }

    fn decode_number(value: &CachedValue) -> Option<u64> {
        value.as_json().and_then(|v| v.as_u64())
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let memo = context();
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let k = key("a");

        for expected in [Provenance::Live, Provenance::Cache] {
            let result = memo
                .memoize(
                    ProducerKind::Quote,
                    &k,
                    "a",
                    decode_number,
                    move || async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Ok((7, CachedValue::Json(json!(7))))
                    },
                    || 0,
                )
                .await;
            assert_eq!(result.value, 7);
            assert_eq!(result.provenance, expected);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let stats = memo.cache.stats().await;
        assert_eq!((stats.hits, stats.misses), (1, 1));
    }

    #[tokio::test]
    async fn test_failure_is_never_cached() {
        let memo = context();
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let k = key("b");

        for _ in 0..2 {
            let result = memo
                .memoize(
                    ProducerKind::Copy,
                    &k,
                    "b",
                    decode_number,
                    move || async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Err::<(u64, CachedValue), _>(ProducerError::Upstream("503".into()))
                    },
                    || 42,
                )
                .await;
            assert!(result.is_fallback());
            assert_eq!(result.value, 42);
        }

        // Each call went back to the operation
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(memo.cache.is_empty().await);
        assert_eq!(memo.errors.counts().upstream_error, 2);
        assert_eq!(memo.errors.recent()[0].producer, ProducerKind::Copy);
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_recomputed() {
        let memo = context();
        let k = key("c");
        memo.cache.set(&k, CachedValue::bytes(vec![1u8])).await;

        let result = memo
            .memoize(
                ProducerKind::Quote,
                &k,
                "c",
                decode_number,
                || async { Ok((3, CachedValue::Json(json!(3)))) },
                || 0,
            )
            .await;

        assert_eq!(result.provenance, Provenance::Live);
        assert_eq!(memo.cache.get(&k).await, Some(CachedValue::Json(json!(3))));
    }

    #[tokio::test]
    async fn test_compute_runs_outside_lock() {
        let memo = context();
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());

        let slow = {
            let memo = memo.clone();
            let started = started.clone();
            let release = release.clone();
            tokio::spawn(async move {
                memo.memoize(
                    ProducerKind::Render,
                    &key("slow"),
                    "slow",
                    decode_number,
                    || async move {
                        started.notify_one();
                        release.notified().await;
                        Ok((1, CachedValue::Json(json!(1))))
                    },
                    || 0,
                )
                .await
            })
        };
        started.notified().await;

        // Other keys stay usable while the compute is parked
        let other = key("other");
        let traffic = tokio::time::timeout(Duration::from_millis(100), async {
            memo.cache.set(&other, CachedValue::Json(json!(2))).await;
            memo.cache.get(&other).await
        })
        .await
        .expect("cache was locked during compute");
        assert_eq!(traffic, Some(CachedValue::Json(json!(2))));

        release.notify_one();
        let result = slow.await.unwrap();
        assert_eq!(result.provenance, Provenance::Live);
        assert!(memo.cache.contains_key(&key("slow")).await);
    }

    #[tokio::test]
    async fn test_bounded_times_out() {
        let err = bounded(Duration::from_millis(10), "slow call", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, ProducerError>(())
        })
        .await
        .unwrap_err();

        assert!(matches!(err, ProducerError::NetworkTimeout(ref msg) if msg.contains("slow call")));
    }

    #[tokio::test]
    async fn test_bounded_passes_result_through() {
        let value = bounded(Duration::from_secs(1), "fast", async { Ok::<_, ProducerError>(5) })
            .await
            .unwrap();
        assert_eq!(value, 5);
    }
}
