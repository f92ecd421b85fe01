//! Key store trait definition

use std::time::Duration;

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::KeyStoreError;

/// Resolves the authorized key blob for an account.
///
/// `Ok("")` means "nothing to grant" and is distinct from
/// [`KeyStoreError::KeyNotFound`].
#[cfg_attr(test, automock)]
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Gets the newline-joined key blob for `account`
    async fn get(&self, account: &str) -> Result<String, KeyStoreError>;

    /// Stores a blob with an expiry window. Read-only stores ignore writes.
    async fn put(&self, _account: &str, _keys: &str, _ttl: Duration) -> Result<(), KeyStoreError> {
        Ok(())
    }

    /// Whether [`KeyStore::put`] persists anything
    fn writable(&self) -> bool {
        false
    }

    /// Store name for logging/metrics
    fn name(&self) -> &'static str;
}
