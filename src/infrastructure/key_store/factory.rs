//! Assembles the key store chain from configuration

use std::sync::Arc;

use tracing::info;

use crate::config::AppConfig;
use crate::domain::directory::DirectoryClient;
use crate::domain::key_store::KeyStore;
use crate::domain::DomainError;
use crate::infrastructure::cache::CacheFactory;

use super::{CacheKeyStore, DirectoryKeyStore, FallbackKeyStore, NullKeyStore};

/// Builds `Fallback(Directory, Cache | Null)` once for the process lifetime
pub fn build_key_store(
    config: &AppConfig,
    client: Arc<dyn DirectoryClient>,
) -> Result<Arc<dyn KeyStore>, DomainError> {
    let primary: Arc<dyn KeyStore> = Arc::new(DirectoryKeyStore::new(
        client,
        config.directory.admin_team.clone(),
        config.directory.user_team.clone(),
    ));

    let secondary: Arc<dyn KeyStore> = match CacheFactory::new().create(&config.cache)? {
        Some(cache) => Arc::new(CacheKeyStore::new(cache)),
        None => Arc::new(NullKeyStore),
    };

    info!(
        primary = primary.name(),
        secondary = secondary.name(),
        ttl_secs = config.cache.ttl_secs,
        "Key store chain ready"
    );

    Ok(Arc::new(FallbackKeyStore::new(
        primary,
        secondary,
        config.cache.ttl(),
    )))
}
