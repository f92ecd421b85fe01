//! Cache-backed key store

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::cache::Cache;
use crate::domain::key_store::{KeyStore, KeyStoreError};

/// Key store over a durable cache, keyed by account name
#[derive(Debug)]
pub struct CacheKeyStore {
    cache: Arc<dyn Cache>,
}

impl CacheKeyStore {
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl KeyStore for CacheKeyStore {
    async fn get(&self, account: &str) -> Result<String, KeyStoreError> {
        match self.cache.get(account).await? {
            Some(keys) => {
                debug!(account = %account, backend = self.cache.backend(), "Cache hit");
                Ok(keys)
            }
            None => {
                debug!(account = %account, backend = self.cache.backend(), "Cache miss");
                Err(KeyStoreError::KeyNotFound)
            }
        }
    }

    async fn put(&self, account: &str, keys: &str, ttl: Duration) -> Result<(), KeyStoreError> {
        self.cache.set(account, keys, ttl).await?;
        Ok(())
    }

    fn writable(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "cache"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::{CacheError, MockCache};
    use crate::infrastructure::cache::InMemoryCache;

    #[tokio::test]
    async fn test_get_existing_entry() {
        let cache = MockCache::new().with_entry("bob", "ssh-rsa BBB...", None);
        let store = CacheKeyStore::new(Arc::new(cache));

        assert_eq!(store.get("bob").await, Ok("ssh-rsa BBB...".to_string()));
    }

    #[tokio::test]
    async fn test_get_missing_entry_is_key_not_found() {
        let store = CacheKeyStore::new(Arc::new(MockCache::new()));

        assert_eq!(store.get("carol").await, Err(KeyStoreError::KeyNotFound));
    }

    #[tokio::test]
    async fn test_put_then_get_with_ttl() {
        let cache = Arc::new(MockCache::new());
        let store = CacheKeyStore::new(cache.clone());

        store
            .put("alice", "ssh-ed25519 AAA", Duration::from_secs(120))
            .await
            .unwrap();

        assert_eq!(store.get("alice").await, Ok("ssh-ed25519 AAA".to_string()));
        assert_eq!(
            cache.ttl("alice").await.unwrap(),
            Some(Duration::from_secs(120))
        );
    }

    #[tokio::test]
    async fn test_backend_errors_are_mapped() {
        let down = CacheKeyStore::new(Arc::new(
            MockCache::new().with_error(CacheError::connection_failed("refused")),
        ));
        assert_eq!(
            down.get("alice").await,
            Err(KeyStoreError::connection_failed("refused"))
        );
        assert_eq!(
            down.put("alice", "k", Duration::from_secs(1)).await,
            Err(KeyStoreError::connection_failed("refused"))
        );

        let denied = CacheKeyStore::new(Arc::new(
            MockCache::new().with_error(CacheError::access_denied("NOAUTH")),
        ));
        assert_eq!(
            denied.get("alice").await,
            Err(KeyStoreError::access_denied("NOAUTH"))
        );
    }

    #[tokio::test]
    async fn test_expired_entry_is_key_not_found() {
        let store = CacheKeyStore::new(Arc::new(InMemoryCache::new()));

        store
            .put("bob", "ssh-rsa BBB", Duration::from_millis(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(store.get("bob").await, Err(KeyStoreError::KeyNotFound));
    }

    #[test]
    fn test_is_writable() {
        assert!(CacheKeyStore::new(Arc::new(MockCache::new())).writable());
    }
}
