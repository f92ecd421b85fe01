use async_trait::async_trait;

use crate::domain::key_store::{KeyStore, KeyStoreError};

/// Stand-in secondary tier when no durable cache is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct NullKeyStore;

#[async_trait]
impl KeyStore for NullKeyStore {
    async fn get(&self, _account: &str) -> Result<String, KeyStoreError> {
        Err(KeyStoreError::KeyNotFound)
    }

    fn name(&self) -> &'static str {
        "null"
    }
}
