//! In-process cache with lazy TTL expiry.

use std::collections::HashMap;
use std::time::Duration;

use super::service::{CacheResult, CacheService};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    /// An entry is expired once the current time reaches its deadline.
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// A single-process cache backed by a `HashMap`.
///
/// Expired entries are treated as absent on read and dropped lazily. Selected
/// with `CACHE_BACKEND=memory` for a single instance running without Redis;
/// snapshots are not shared across processes. Tests use it as the cache
/// double.
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
    default_ttl: Duration,
}

impl MemoryCache {
    pub fn new(default_ttl_seconds: u64) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl: Duration::from_secs(default_ttl_seconds),
        }
    }

    /// Returns true if a live entry exists for `key`.
    pub async fn contains(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .get(key)
            .is_some_and(|e| !e.is_expired(now))
    }

    /// Remaining lifetime of a live entry.
    pub async fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .get(key)
            .filter(|e| !e.is_expired(now))
            .map(|e| e.expires_at - now)
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| !e.is_expired(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let now = Instant::now();

        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_expired(now) => {
                    debug!(key, "Cache HIT");
                    return Ok(Some(entry.value.clone()));
                }
                None => {
                    debug!(key, "Cache MISS");
                    return Ok(None);
                }
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|e| e.is_expired(now)) {
            entries.remove(key);
            debug!(key, "Cache EXPIRED");
        }

        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> CacheResult<()> {
        let ttl = ttl_seconds
            .map(Duration::from_secs)
            .unwrap_or(self.default_ttl);

        self.entries.write().await.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        debug!(key, ttl_secs = ttl.as_secs(), "Cache SET");

        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        if self.entries.write().await.remove(key).is_some() {
            debug!(key, "Cache DEL");
        }
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = MemoryCache::new(60);
        cache.set("book:1", "{}", None).await.unwrap();

        assert_eq!(cache.get("book:1").await.unwrap().as_deref(), Some("{}"));
        assert!(cache.contains("book:1").await);
    }

    #[tokio::test]
    async fn test_missing_key_is_miss() {
        let cache = MemoryCache::new(60);
        assert!(cache.get("book:404").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_removes_entry() {
        let cache = MemoryCache::new(60);
        cache.set("book:1", "{}", None).await.unwrap();
        cache.delete("book:1").await.unwrap();

        assert!(cache.get("book:1").await.unwrap().is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete_absent_key_is_ok() {
        let cache = MemoryCache::new(60);
        assert!(cache.delete("nope").await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = MemoryCache::new(60);
        cache.set("book:1", "{}", Some(10)).await.unwrap();

        tokio::time::advance(Duration::from_secs(9)).await;
        assert!(cache.get("book:1").await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get("book:1").await.unwrap().is_none());
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overwrite_refreshes_ttl() {
        let cache = MemoryCache::new(10);
        cache.set("book:1", "old", None).await.unwrap();

        tokio::time::advance(Duration::from_secs(8)).await;
        cache.set("book:1", "new", None).await.unwrap();

        tokio::time::advance(Duration::from_secs(8)).await;
        assert_eq!(cache.get("book:1").await.unwrap().as_deref(), Some("new"));
        assert_eq!(
            cache.ttl_remaining("book:1").await,
            Some(Duration::from_secs(2))
        );
    }
}
