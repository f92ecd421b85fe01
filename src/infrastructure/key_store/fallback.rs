//! Tiered key resolution: authoritative store first, cache second

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::domain::key_store::{KeyStore, KeyStoreError};
use crate::infrastructure::observability::{record_cache_write, record_key_lookup};

/// Combines a primary and a secondary key store.
///
/// A non-empty primary result is written through to the secondary and
/// returned. Any primary error, and an empty primary result, defers to the
/// secondary, whose answer is returned unmodified. The primary is called once
/// per request and there is no third tier.
pub struct FallbackKeyStore {
    primary: Arc<dyn KeyStore>,
    secondary: Arc<dyn KeyStore>,
    ttl: Duration,
}

impl FallbackKeyStore {
    pub fn new(primary: Arc<dyn KeyStore>, secondary: Arc<dyn KeyStore>, ttl: Duration) -> Self {
        Self {
            primary,
            secondary,
            ttl,
        }
    }

    async fn write_through(&self, account: &str, keys: &str) {
        if !self.secondary.writable() {
            return;
        }

        match self.secondary.put(account, keys, self.ttl).await {
            Ok(()) => {
                debug!(account = %account, store = self.secondary.name(), "Refreshed cached keys");
                record_cache_write(true);
            }
            Err(e) => {
                warn!(account = %account, store = self.secondary.name(), error = %e, "Failed to refresh cached keys");
                record_cache_write(false);
            }
        }
    }
}

fn log_primary_failure(account: &str, store: &str, err: &KeyStoreError) {
    match err {
        KeyStoreError::KeyNotFound => {
            debug!(account = %account, store, "No keys in primary store")
        }
        KeyStoreError::ConnectionFailed { .. } => {
            warn!(account = %account, store, error = %err, "Primary store unreachable, using fallback")
        }
        KeyStoreError::AccessDenied { .. } => {
            error!(account = %account, store, error = %err, "Primary store denied access, using fallback")
        }
    }
}

fn outcome(result: &Result<String, KeyStoreError>) -> &'static str {
    match result {
        Ok(keys) if keys.is_empty() => "empty",
        Ok(_) => "hit",
        Err(e) => e.kind(),
    }
}

#[async_trait]
impl KeyStore for FallbackKeyStore {
    async fn get(&self, account: &str) -> Result<String, KeyStoreError> {
        let primary = self.primary.get(account).await;
        record_key_lookup("primary", outcome(&primary));

        match primary {
            Ok(keys) if !keys.is_empty() => {
                self.write_through(account, &keys).await;
                return Ok(keys);
            }
            Ok(_) => {
                debug!(account = %account, "Primary store returned no keys, consulting fallback")
            }
            Err(ref e) => log_primary_failure(account, self.primary.name(), e),
        }

        let secondary = self.secondary.get(account).await;
        record_key_lookup("fallback", outcome(&secondary));

        secondary
    }

    fn name(&self) -> &'static str {
        "fallback"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::{Cache, CacheError, MockCache};
    use crate::domain::key_store::MockKeyStore;
    use crate::infrastructure::cache::InMemoryCache;
    use crate::infrastructure::key_store::{CacheKeyStore, NullKeyStore};

    const TTL: Duration = Duration::from_secs(3600);

    fn primary_returning(result: Result<String, KeyStoreError>) -> MockKeyStore {
        let mut primary = MockKeyStore::new();
        primary
            .expect_get()
            .times(1)
            .returning(move |_| result.clone());
        primary.expect_name().return_const("primary");
        primary
    }

    fn secondary_returning(result: Result<String, KeyStoreError>) -> MockKeyStore {
        let mut secondary = MockKeyStore::new();
        secondary
            .expect_get()
            .times(1)
            .returning(move |_| result.clone());
        secondary.expect_writable().return_const(true);
        secondary.expect_put().times(0);
        secondary.expect_name().return_const("secondary");
        secondary
    }

    #[tokio::test]
    async fn test_primary_hit_writes_through_with_ttl() {
        let cache = Arc::new(InMemoryCache::new());
        let secondary = Arc::new(CacheKeyStore::new(cache.clone()));
        let proxy = FallbackKeyStore::new(
            Arc::new(primary_returning(Ok("ssh-ed25519 AAA alice".to_string()))),
            secondary.clone(),
            TTL,
        );

        assert_eq!(proxy.get("alice").await, Ok("ssh-ed25519 AAA alice".to_string()));

        assert_eq!(secondary.get("alice").await, Ok("ssh-ed25519 AAA alice".to_string()));
        let remaining = cache.ttl("alice").await.unwrap().unwrap();
        assert!(remaining > Duration::from_secs(3500) && remaining <= TTL);
    }

    #[tokio::test]
    async fn test_primary_hit_does_not_read_secondary() {
        let mut secondary = MockKeyStore::new();
        secondary.expect_get().times(0);
        secondary.expect_writable().return_const(true);
        secondary
            .expect_put()
            .withf(|account: &str, keys: &str, ttl: &Duration| {
                account == "alice" && keys == "ssh-ed25519 AAA" && *ttl == TTL
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        secondary.expect_name().return_const("secondary");

        let proxy = FallbackKeyStore::new(
            Arc::new(primary_returning(Ok("ssh-ed25519 AAA".to_string()))),
            Arc::new(secondary),
            TTL,
        );

        assert_eq!(proxy.get("alice").await, Ok("ssh-ed25519 AAA".to_string()));
    }

    #[tokio::test]
    async fn test_write_through_failure_still_returns_primary() {
        let cache = MockCache::new().with_error(CacheError::connection_failed("down"));
        let proxy = FallbackKeyStore::new(
            Arc::new(primary_returning(Ok("ssh-rsa BBB".to_string()))),
            Arc::new(CacheKeyStore::new(Arc::new(cache))),
            TTL,
        );

        assert_eq!(proxy.get("bob").await, Ok("ssh-rsa BBB".to_string()));
    }

    #[tokio::test]
    async fn test_primary_errors_return_secondary_verbatim() {
        let primary_errors = [
            KeyStoreError::connection_failed("unreachable"),
            KeyStoreError::access_denied("bad token"),
            KeyStoreError::KeyNotFound,
        ];
        let secondary_results = [
            Ok("ssh-rsa BBB...".to_string()),
            Err(KeyStoreError::KeyNotFound),
            Err(KeyStoreError::connection_failed("cache down")),
            Ok(String::new()),
        ];

        for primary_error in &primary_errors {
            for secondary_result in &secondary_results {
                let proxy = FallbackKeyStore::new(
                    Arc::new(primary_returning(Err(primary_error.clone()))),
                    Arc::new(secondary_returning(secondary_result.clone())),
                    TTL,
                );

                assert_eq!(&proxy.get("bob").await, secondary_result);
            }
        }
    }

    #[tokio::test]
    async fn test_primary_empty_falls_through_to_secondary() {
        let proxy = FallbackKeyStore::new(
            Arc::new(primary_returning(Ok(String::new()))),
            Arc::new(secondary_returning(Ok("ssh-ed25519 CACHED".to_string()))),
            TTL,
        );

        assert_eq!(proxy.get("alice").await, Ok("ssh-ed25519 CACHED".to_string()));
    }

    #[tokio::test]
    async fn test_unreachable_directory_serves_warm_cache() {
        let cache = MockCache::new().with_entry("bob", "ssh-rsa BBB...", Some(TTL));
        let proxy = FallbackKeyStore::new(
            Arc::new(primary_returning(Err(KeyStoreError::connection_failed("down")))),
            Arc::new(CacheKeyStore::new(Arc::new(cache))),
            TTL,
        );

        assert_eq!(proxy.get("bob").await, Ok("ssh-rsa BBB...".to_string()));
    }

    #[tokio::test]
    async fn test_unreachable_directory_cold_cache_is_key_not_found() {
        let proxy = FallbackKeyStore::new(
            Arc::new(primary_returning(Err(KeyStoreError::connection_failed("down")))),
            Arc::new(CacheKeyStore::new(Arc::new(MockCache::new()))),
            TTL,
        );

        assert_eq!(proxy.get("carol").await, Err(KeyStoreError::KeyNotFound));
    }

    #[tokio::test]
    async fn test_null_secondary() {
        let proxy = FallbackKeyStore::new(
            Arc::new(primary_returning(Err(KeyStoreError::connection_failed("down")))),
            Arc::new(NullKeyStore),
            TTL,
        );
        assert_eq!(proxy.get("carol").await, Err(KeyStoreError::KeyNotFound));

        let proxy = FallbackKeyStore::new(
            Arc::new(primary_returning(Ok("ssh-ed25519 AAA".to_string()))),
            Arc::new(NullKeyStore),
            TTL,
        );
        assert_eq!(proxy.get("alice").await, Ok("ssh-ed25519 AAA".to_string()));
    }

    #[tokio::test]
    async fn test_proxies_nest() {
        let inner = FallbackKeyStore::new(
            Arc::new(primary_returning(Err(KeyStoreError::connection_failed("down")))),
            Arc::new(secondary_returning(Err(KeyStoreError::KeyNotFound))),
            TTL,
        );
        let outer = FallbackKeyStore::new(
            Arc::new(inner),
            Arc::new(secondary_returning(Ok("ssh-rsa OUTER".to_string()))),
            TTL,
        );

        assert_eq!(outer.get("dave").await, Ok("ssh-rsa OUTER".to_string()));
    }
}
