//! In-process query cache for list responses.
//!
//! Entries are keyed by `(resource, canonical query string)` and stay fresh
//! for a configured window; any successful mutation against a resource
//! invalidates every cached query for it, forcing the next read to refetch.

use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

use log::debug;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::http::HttpError;

/// Cache key: resource root plus the encoded query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub resource: String,
    pub query: String,
}

impl CacheKey {
    pub fn new(resource: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            query: query.into(),
        }
    }
}

struct Entry {
    value: Value,
    fetched_at: Instant,
}

pub struct QueryCache {
    ttl: Duration,
    entries: RwLock<HashMap<CacheKey, Entry>>,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the cached payload for `key` if it is still fresh.
    pub async fn get(&self, key: &CacheKey) -> Option<Value> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if entry.fetched_at.elapsed() > self.ttl {
            return None;
        }
        Some(entry.value.clone())
    }

    pub async fn put(&self, key: CacheKey, value: Value) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            Entry {
                value,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Serves `key` from cache when fresh, otherwise runs `fetch` and
    /// stores the result. Fetch failures are not cached.
    pub async fn get_or_fetch<F, Fut>(&self, key: CacheKey, fetch: F) -> Result<Value, HttpError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, HttpError>>,
    {
        if let Some(value) = self.get(&key).await {
            debug!(resource = key.resource.as_str(); "Cache hit");
            return Ok(value);
        }
        let value = fetch().await?;
        self.put(key, value.clone()).await;
        Ok(value)
    }

    /// Drops every cached query for `resource`. Called after a successful
    /// mutation so the next list read refetches.
    pub async fn invalidate_resource(&self, resource: &str) {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| key.resource != resource);
        debug!(resource = resource, dropped = before - entries.len(); "Cache invalidated");
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cache() -> QueryCache {
        QueryCache::new(Duration::from_secs(60))
    }

    #[tokio::test]
    async fn fresh_entries_are_served_without_refetching() {
        let cache = cache();
        let calls = AtomicUsize::new(0);
        let key = CacheKey::new("courses", "?page=1");

        for _ in 0..3 {
            let value = cache
                .get_or_fetch(key.clone(), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(json!({"results": [1, 2]}))
                })
                .await
                .unwrap();
            assert_eq!(value, json!({"results": [1, 2]}));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_entries_refetch() {
        let cache = QueryCache::new(Duration::ZERO);
        let calls = AtomicUsize::new(0);
        let key = CacheKey::new("courses", "");

        for _ in 0..2 {
            cache
                .get_or_fetch(key.clone(), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(json!([]))
                })
                .await
                .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn mutation_invalidation_is_scoped_to_the_resource() {
        let cache = cache();
        cache.put(CacheKey::new("courses", "?page=1"), json!(1)).await;
        cache.put(CacheKey::new("courses", "?page=2"), json!(2)).await;
        cache.put(CacheKey::new("students", ""), json!(3)).await;

        cache.invalidate_resource("courses").await;

        assert_eq!(cache.len().await, 1);
        assert!(cache.get(&CacheKey::new("courses", "?page=1")).await.is_none());
        assert_eq!(cache.get(&CacheKey::new("students", "")).await, Some(json!(3)));
    }

    #[tokio::test]
    async fn failed_fetches_are_not_cached() {
        let cache = cache();
        let key = CacheKey::new("courses", "");
        let err = cache
            .get_or_fetch(key.clone(), || async {
                Err(HttpError::NotFound { path: "/courses/".into() })
            })
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(cache.len().await, 0);
    }
}
