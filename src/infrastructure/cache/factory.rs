//! Cache factory for runtime selection

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use crate::config::CacheConfig;
use crate::domain::cache::Cache;
use crate::domain::DomainError;

use super::in_memory::{InMemoryCache, InMemoryCacheConfig};
use super::redis::{RedisCache, RedisCacheConfig};

/// Supported cache backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheType {
    /// No durable cache; lookups fall back to nothing
    #[default]
    None,
    /// In-memory cache using moka
    InMemory,
    /// Redis cache
    Redis,
}

/// Factory for creating cache instances
#[derive(Debug, Default)]
pub struct CacheFactory;

impl CacheFactory {
    /// Creates a new cache factory
    pub fn new() -> Self {
        Self
    }

    /// Creates the configured cache, or `None` when caching is disabled
    pub fn create(&self, config: &CacheConfig) -> Result<Option<Arc<dyn Cache>>, DomainError> {
        match config.backend {
            CacheType::None => {
                info!("Key cache disabled");
                Ok(None)
            }
            CacheType::InMemory => {
                info!(max_entries = config.max_entries, "Using in-memory key cache");
                let cache_config = InMemoryCacheConfig::default().with_max_capacity(config.max_entries);
                Ok(Some(Arc::new(InMemoryCache::with_config(cache_config))))
            }
            CacheType::Redis => {
                if config.endpoints.is_empty() {
                    return Err(DomainError::configuration(
                        "At least one endpoint is required for the redis cache",
                    ));
                }

                let mut redis_config = RedisCacheConfig::new(config.endpoints.clone());

                if !config.prefix.is_empty() {
                    redis_config = redis_config.with_key_prefix(config.prefix.clone());
                }

                let cache = RedisCache::new(redis_config)
                    .map_err(|e| DomainError::configuration(e.to_string()))?;

                info!(endpoints = ?config.endpoints, prefix = %config.prefix, "Using redis key cache");
                Ok(Some(Arc::new(cache)))
            }
        }
    }
}
