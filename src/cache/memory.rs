//! In-memory cache implementation using moka
//!
//! Fast, thread-safe in-process cache with TTL expiration and
//! prefix-based bulk invalidation.

use super::CacheLayer;
use anyhow::{Context, Result};
use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default maximum cache capacity (number of entries)
const DEFAULT_MAX_CAPACITY: u64 = 10_000;

/// Default TTL for cache entries (1 hour)
const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Cache entry wrapper that stores serialized JSON data along with its
/// own time-to-live. This allows storing any serializable type in the
/// cache with per-entry expiry.
#[derive(Clone)]
struct CacheEntry {
    data: Arc<String>,
    ttl: Duration,
}

impl CacheEntry {
    fn new<T: Serialize>(value: &T, ttl: Duration) -> Result<Self> {
        let json = serde_json::to_string(value).context("Failed to serialize cache value")?;
        Ok(Self {
            data: Arc::new(json),
            ttl,
        })
    }

    fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.data).context("Failed to deserialize cache value")
    }
}

/// Expiry policy reading each entry's own TTL, so the duration passed
/// to `set` is honored exactly. Overwriting a key restarts the clock
/// with the new entry's TTL.
struct PerEntryExpiry;

impl Expiry<String, CacheEntry> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-memory cache using moka.
///
/// Values are stored as JSON strings to support generic types. Each
/// entry expires after the TTL it was stored with; `default_ttl` is
/// what callers without an opinion should pass to `set`.
pub struct MemoryCache {
    cache: Cache<String, CacheEntry>,
    default_ttl: Duration,
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entry_count", &self.cache.entry_count())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl MemoryCache {
    /// Create a new memory cache with default settings
    /// (10,000 entries, 1 hour TTL).
    pub fn new() -> Self {
        Self::with_capacity_and_ttl(DEFAULT_MAX_CAPACITY, DEFAULT_TTL)
    }

    /// Create a new memory cache with custom capacity and default TTL
    pub fn with_capacity_and_ttl(max_capacity: u64, default_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryExpiry)
            .support_invalidation_closures()
            .build();

        Self { cache, default_ttl }
    }

    /// Get the default TTL for this cache
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Get the current number of entries in the cache
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheLayer for MemoryCache {
    /// Get a value from cache.
    ///
    /// Returns `Ok(Some(value))` if the key exists and hasn't expired,
    /// `Ok(None)` otherwise.
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>> {
        match self.cache.get(key).await {
            Some(entry) => {
                let value = entry.deserialize()?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Set a value in cache. The entry expires after `ttl`.
    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<()> {
        let entry = CacheEntry::new(value, ttl)?;
        self.cache.insert(key.to_string(), entry).await;

        Ok(())
    }

    /// Delete a value from cache. No-op if the key doesn't exist.
    async fn delete(&self, key: &str) -> Result<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    /// Delete all values whose key starts with the given prefix.
    ///
    /// Iterates over all entries; acceptable for the capacities this
    /// cache is configured with.
    async fn delete_prefix(&self, prefix: &str) -> Result<()> {
        let keys_to_delete: Vec<String> = self
            .cache
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| (*key).clone())
            .collect();

        for key in keys_to_delete {
            self.cache.invalidate(&key).await;
        }

        Ok(())
    }

    /// Clear all cache entries
    async fn clear(&self) -> Result<()> {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemoryCache::new();

        cache
            .set("key1", &"value1".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        let result: Option<String> = cache.get("key1").await.unwrap();
        assert_eq!(result, Some("value1".to_string()));
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let cache = MemoryCache::new();

        let result: Option<String> = cache.get("nonexistent").await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_delete() {
        let cache = MemoryCache::new();

        cache
            .set("key1", &"value1".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        cache.delete("key1").await.unwrap();

        let result: Option<String> = cache.get("key1").await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_delete_prefix() {
        let cache = MemoryCache::new();

        cache
            .set("news:list:1:10", &"page1".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .set("news:list:2:10", &"page2".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .set("users:1", &"user1".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        cache.delete_prefix("news:list:").await.unwrap();

        let page1: Option<String> = cache.get("news:list:1:10").await.unwrap();
        let page2: Option<String> = cache.get("news:list:2:10").await.unwrap();
        let user1: Option<String> = cache.get("users:1").await.unwrap();

        assert_eq!(page1, None);
        assert_eq!(page2, None);
        assert_eq!(user1, Some("user1".to_string()));
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = MemoryCache::new();

        cache
            .set("key1", &"value1".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .set("key2", &"value2".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        cache.clear().await.unwrap();

        let result1: Option<String> = cache.get("key1").await.unwrap();
        let result2: Option<String> = cache.get("key2").await.unwrap();

        assert_eq!(result1, None);
        assert_eq!(result2, None);
    }

    #[tokio::test]
    async fn test_complex_types() {
        let cache = MemoryCache::new();

        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        struct Article {
            id: i64,
            title: String,
            content: String,
        }

        let article = Article {
            id: 1,
            title: "Test Article".to_string(),
            content: "This is the content".to_string(),
        };

        cache
            .set("article:1", &article, Duration::from_secs(60))
            .await
            .unwrap();

        let result: Option<Article> = cache.get("article:1").await.unwrap();
        assert_eq!(result, Some(article));
    }

    #[tokio::test]
    async fn test_overwrite_existing_key() {
        let cache = MemoryCache::new();

        cache
            .set("key1", &"value1".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .set("key1", &"value2".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        let result: Option<String> = cache.get("key1").await.unwrap();
        assert_eq!(result, Some("value2".to_string()));
    }

    #[tokio::test]
    async fn test_per_entry_ttl_honored() {
        let cache = MemoryCache::with_capacity_and_ttl(1000, Duration::from_secs(3600));

        cache
            .set("short", &"gone soon".to_string(), Duration::from_millis(10))
            .await
            .unwrap();
        cache
            .set("long", &"still here".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        cache.cache.run_pending_tasks().await;

        let short: Option<String> = cache.get("short").await.unwrap();
        let long: Option<String> = cache.get("long").await.unwrap();

        assert_eq!(short, None, "Entry must expire after its own TTL");
        assert_eq!(long, Some("still here".to_string()));
    }

    #[tokio::test]
    async fn test_overwrite_restarts_ttl() {
        let cache = MemoryCache::new();

        cache
            .set("key1", &"old".to_string(), Duration::from_millis(10))
            .await
            .unwrap();
        cache
            .set("key1", &"new".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        cache.cache.run_pending_tasks().await;

        let result: Option<String> = cache.get("key1").await.unwrap();
        assert_eq!(result, Some("new".to_string()));
    }

    #[tokio::test]
    async fn test_entry_count() {
        let cache = MemoryCache::new();

        assert_eq!(cache.entry_count(), 0);

        cache
            .set("key1", &"value1".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        cache.cache.run_pending_tasks().await;
        assert_eq!(cache.entry_count(), 1);

        cache
            .set("key2", &"value2".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        cache.cache.run_pending_tasks().await;
        assert_eq!(cache.entry_count(), 2);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc as StdArc;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(20))]

            /// Cache entries automatically expire after the configured TTL.
            /// A very short TTL (10ms) keeps the test fast.
            #[test]
            fn cache_ttl_expiration(
                key in "[a-z]{1,10}",
                value in "[a-z]{1,100}"
            ) {
                let rt = tokio::runtime::Runtime::new().unwrap();
                rt.block_on(async {
                    let ttl = Duration::from_millis(10);
                    let cache = MemoryCache::with_capacity_and_ttl(1000, ttl);

                    cache.set(&key, &value, ttl).await.unwrap();

                    let result: Option<String> = cache.get(&key).await.unwrap();
                    prop_assert_eq!(result, Some(value.clone()));

                    tokio::time::sleep(Duration::from_millis(50)).await;
                    cache.cache.run_pending_tasks().await;

                    let result_after_ttl: Option<String> = cache.get(&key).await.unwrap();
                    prop_assert_eq!(result_after_ttl, None,
                        "Cache entry should expire after TTL. Key: {}, TTL: {:?}", key, ttl);

                    Ok(())
                })?;
            }

            /// Read-through pattern: a miss loads from source and caches,
            /// subsequent reads hit the cache without touching the source.
            #[test]
            fn cache_miss_handling(
                key in "[a-z]{1,10}",
                value in "[a-z]{1,100}"
            ) {
                let rt = tokio::runtime::Runtime::new().unwrap();
                rt.block_on(async {
                    let cache = MemoryCache::new();
                    let ttl = Duration::from_secs(60);

                    let source_call_count = StdArc::new(AtomicUsize::new(0));
                    let source_value = value.clone();

                    let load_from_source = |call_count: StdArc<AtomicUsize>, val: String| {
                        call_count.fetch_add(1, Ordering::SeqCst);
                        val
                    };

                    let result1: Option<String> = cache.get(&key).await.unwrap();
                    prop_assert_eq!(result1, None, "First access should miss cache");

                    let loaded_value =
                        load_from_source(source_call_count.clone(), source_value.clone());
                    cache.set(&key, &loaded_value, ttl).await.unwrap();

                    prop_assert_eq!(source_call_count.load(Ordering::SeqCst), 1,
                        "Source should be called exactly once on cache miss");

                    let result2: Option<String> = cache.get(&key).await.unwrap();
                    prop_assert_eq!(result2, Some(source_value.clone()),
                        "Second access should hit cache and return correct value");

                    prop_assert_eq!(source_call_count.load(Ordering::SeqCst), 1,
                        "Source should NOT be called on cache hit");

                    Ok(())
                })?;
            }

            /// TTL expiry turns the next read into a miss, triggering a reload.
            #[test]
            fn ttl_expiration_triggers_reload(
                key in "[a-z]{1,10}",
                value in "[a-z]{1,100}"
            ) {
                let rt = tokio::runtime::Runtime::new().unwrap();
                rt.block_on(async {
                    let ttl = Duration::from_millis(10);
                    let cache = MemoryCache::with_capacity_and_ttl(1000, ttl);

                    let source_call_count = StdArc::new(AtomicUsize::new(0));

                    async fn get_or_load(
                        cache: &MemoryCache,
                        key: &str,
                        call_count: &AtomicUsize,
                        value: &str,
                        ttl: Duration,
                    ) -> String {
                        let cached: Option<String> = cache.get(key).await.unwrap();
                        match cached {
                            Some(v) => v,
                            None => {
                                call_count.fetch_add(1, Ordering::SeqCst);
                                let val = value.to_string();
                                cache.set(key, &val, ttl).await.unwrap();
                                val
                            }
                        }
                    }

                    let result1 = get_or_load(&cache, &key, &source_call_count, &value, ttl).await;
                    prop_assert_eq!(result1, value.clone());
                    prop_assert_eq!(source_call_count.load(Ordering::SeqCst), 1,
                        "First access should trigger source load");

                    let result2 = get_or_load(&cache, &key, &source_call_count, &value, ttl).await;
                    prop_assert_eq!(result2, value.clone());
                    prop_assert_eq!(source_call_count.load(Ordering::SeqCst), 1,
                        "Second access should hit cache, no source load");

                    tokio::time::sleep(Duration::from_millis(50)).await;
                    cache.cache.run_pending_tasks().await;

                    let result3 = get_or_load(&cache, &key, &source_call_count, &value, ttl).await;
                    prop_assert_eq!(result3, value.clone());
                    prop_assert_eq!(source_call_count.load(Ordering::SeqCst), 2,
                        "After TTL expiration, source should be called again");

                    Ok(())
                })?;
            }
        }
    }
}
