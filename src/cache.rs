use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use moka::future::Cache;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::{PipewatchError, Result};

/// Only a handful of aggregation keys ever live here.
const CACHE_CAPACITY: u64 = 64;

/// TTL-memoized refresh cache for the expensive dashboard aggregations.
///
/// Values are stored as JSON so one cache can hold every record kind; each
/// tier (short-interval, hourly) is its own instance with its own TTL.
/// Concurrent callers for the same key coalesce onto a single producer run,
/// so an aggregation is computed at most once per expiry. Producer errors
/// are returned to every waiter and never cached.
pub struct RefreshCache {
    inner: Cache<String, JsonValue>,
}

impl RefreshCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .time_to_live(ttl)
                .max_capacity(CACHE_CAPACITY)
                .build(),
        }
    }

    /// Returns the cached value for `key` when fresh; otherwise runs
    /// `producer`, stores its result, and returns it.
    pub async fn get_or_refresh<T, F, Fut>(&self, key: &str, producer: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let value = self
            .inner
            .try_get_with(key.to_string(), async move {
                debug!("Cache miss for {key}, refreshing");
                let produced = producer().await?;
                serde_json::to_value(produced).map_err(PipewatchError::from)
            })
            .await
            .map_err(|e: Arc<PipewatchError>| PipewatchError::Cache(e.to_string()))?;

        serde_json::from_value(value).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_second_call_within_ttl_hits_cache() {
        let cache = RefreshCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);

        let produce = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, PipewatchError>(vec![1u64, 2, 3])
        };

        let first: Vec<u64> = cache.get_or_refresh("key", produce).await.unwrap();
        let second: Vec<u64> = cache.get_or_refresh("key", produce).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expiry_triggers_exactly_one_recomputation() {
        let cache = RefreshCache::new(Duration::from_millis(50));
        let calls = AtomicUsize::new(0);

        let produce = || async {
            Ok::<_, PipewatchError>(calls.fetch_add(1, Ordering::SeqCst))
        };

        let _: usize = cache.get_or_refresh("key", produce).await.unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;
        let _: usize = cache.get_or_refresh("key", produce).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_callers_coalesce() {
        let cache = Arc::new(RefreshCache::new(Duration::from_secs(60)));
        let calls = Arc::new(AtomicUsize::new(0));

        let slow_produce = {
            let calls = Arc::clone(&calls);
            move || {
                let calls = Arc::clone(&calls);
                async move {
                    tokio::time::sleep(Duration::from_millis(30)).await;
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, PipewatchError>("value".to_string())
                }
            }
        };

        let (a, b): (Result<String>, Result<String>) = tokio::join!(
            cache.get_or_refresh("key", slow_produce.clone()),
            cache.get_or_refresh("key", slow_produce),
        );

        assert_eq!(a.unwrap(), "value");
        assert_eq!(b.unwrap(), "value");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_producer_error_not_cached() {
        let cache = RefreshCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);

        let failing = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<u64, _>(PipewatchError::Cache("upstream down".to_string()))
        };
        let result: Result<u64> = cache.get_or_refresh("key", failing).await;
        assert!(result.is_err());

        let ok = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, PipewatchError>(7u64)
        };
        let value: u64 = cache.get_or_refresh("key", ok).await.unwrap();
        assert_eq!(value, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let cache = RefreshCache::new(Duration::from_secs(60));

        let a: u64 = cache
            .get_or_refresh("a", || async { Ok::<_, PipewatchError>(1u64) })
            .await
            .unwrap();
        let b: u64 = cache
            .get_or_refresh("b", || async { Ok::<_, PipewatchError>(2u64) })
            .await
            .unwrap();
        assert_eq!((a, b), (1, 2));
    }
}
