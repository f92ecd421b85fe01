//! In-memory cache implementation using moka

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache as MokaCache;

use crate::domain::cache::{Cache, CacheError};

/// Configuration for in-memory cache
#[derive(Debug, Clone)]
pub struct InMemoryCacheConfig {
    /// Maximum number of entries
    pub max_capacity: u64,
}

impl Default for InMemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
        }
    }
}

impl InMemoryCacheConfig {
    /// Creates a new configuration with specified max capacity
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }
}

/// Cache entry stored in moka
#[derive(Debug, Clone)]
struct CacheEntry {
    data: String,
    /// Expiration timestamp (millis since epoch)
    expires_at: u64,
}

/// Process-local cache. Entries expire individually; a lookup past an
/// entry's expiry evicts it and reports a miss.
#[derive(Debug)]
pub struct InMemoryCache {
    cache: MokaCache<String, CacheEntry>,
}

impl InMemoryCache {
    /// Creates a new in-memory cache with default configuration
    pub fn new() -> Self {
        Self::with_config(InMemoryCacheConfig::default())
    }

    /// Creates a new in-memory cache with the given configuration
    pub fn with_config(config: InMemoryCacheConfig) -> Self {
        Self {
            cache: MokaCache::builder()
                .max_capacity(config.max_capacity)
                .build(),
        }
    }

    fn current_time_millis() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }

    fn is_expired(entry: &CacheEntry) -> bool {
        Self::current_time_millis() >= entry.expires_at
    }
}

/// Absolute expiry for an entry written at `now`, clamped to `u64::MAX`
fn expiry_millis(now: u64, ttl: Duration) -> u64 {
    now.saturating_add(u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX))
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match self.cache.get(key).await {
            Some(entry) => {
                if Self::is_expired(&entry) {
                    self.cache.remove(key).await;
                    return Ok(None);
                }

                Ok(Some(entry.data))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let expires_at = expiry_millis(Self::current_time_millis(), ttl);
        let entry = CacheEntry {
            data: value.to_string(),
            expires_at,
        };

        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, CacheError> {
        match self.cache.get(key).await {
            Some(entry) => {
                let now = Self::current_time_millis();

                if entry.expires_at <= now {
                    self.cache.remove(key).await;
                    Ok(None)
                } else {
                    Ok(Some(Duration::from_millis(entry.expires_at - now)))
                }
            }
            None => Ok(None),
        }
    }

    fn backend(&self) -> &'static str {
        "in_memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = InMemoryCache::new();

        cache
            .set("alice", "ssh-ed25519 AAA alice", Duration::from_secs(60))
            .await
            .unwrap();

        let result = cache.get("alice").await.unwrap();
        assert_eq!(result, Some("ssh-ed25519 AAA alice".to_string()));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let cache = InMemoryCache::new();

        assert!(cache.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_overwrites_and_resets_ttl() {
        let cache = InMemoryCache::new();

        cache
            .set("bob", "old", Duration::from_secs(5))
            .await
            .unwrap();
        cache
            .set("bob", "new", Duration::from_secs(600))
            .await
            .unwrap();

        assert_eq!(cache.get("bob").await.unwrap(), Some("new".to_string()));
        let ttl = cache.ttl("bob").await.unwrap().unwrap();
        assert!(ttl > Duration::from_secs(500));
    }

    #[tokio::test]
    async fn test_expired_entry_is_absent() {
        let cache = InMemoryCache::new();

        cache
            .set("carol", "ssh-rsa CCC", Duration::from_millis(20))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(cache.get("carol").await.unwrap().is_none());
        assert!(cache.ttl("carol").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_huge_ttl_saturates_instead_of_overflowing() {
        let cache = InMemoryCache::new();

        cache
            .set("alice", "ssh-ed25519 AAA", Duration::from_secs(u64::MAX / 1000))
            .await
            .unwrap();
        cache
            .set("bob", "ssh-rsa BBB", Duration::MAX)
            .await
            .unwrap();

        assert_eq!(cache.get("alice").await.unwrap(), Some("ssh-ed25519 AAA".to_string()));
        assert_eq!(cache.get("bob").await.unwrap(), Some("ssh-rsa BBB".to_string()));
        assert!(cache.ttl("bob").await.unwrap().unwrap() > Duration::from_secs(86_400 * 365));
    }

    #[test]
    fn test_expiry_saturates() {
        assert_eq!(expiry_millis(u64::MAX - 5, Duration::from_secs(60)), u64::MAX);
        assert_eq!(expiry_millis(1_000, Duration::from_millis(500)), 1_500);
    }
}
