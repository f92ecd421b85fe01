//! Cache trait definition

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Failures of a cache backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("Cache connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Cache access denied: {message}")]
    AccessDenied { message: String },
}

impl CacheError {
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            message: message.into(),
        }
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied {
            message: message.into(),
        }
    }
}

/// Durable string key/value store with per-entry TTL.
///
/// An entry read after its expiry must be reported as absent by the
/// implementation itself.
#[async_trait]
pub trait Cache: Send + Sync + Debug {
    /// Gets a value, `None` if missing or expired
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Upserts a value, resetting its expiry window
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Gets the remaining TTL for a key
    async fn ttl(&self, key: &str) -> Result<Option<Duration>, CacheError>;

    /// Backend name for logging
    fn backend(&self) -> &'static str;
}
