use thiserror::Error;

use crate::domain::cache::CacheError;
use crate::domain::directory::DirectoryError;

/// Errors surfaced by any key store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyStoreError {
    /// Transient; safe to fall back to another tier
    #[error("Key store connection failed: {message}")]
    ConnectionFailed { message: String },

    /// Credential or configuration problem
    #[error("Key store access denied: {message}")]
    AccessDenied { message: String },

    /// No keys or no entry for the account
    #[error("Key not found")]
    KeyNotFound,
}

impl KeyStoreError {
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

    /// Short label used for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConnectionFailed { .. } => "connection_failed",
            Self::AccessDenied { .. } => "access_denied",
            Self::KeyNotFound => "not_found",
        }
    }
}

impl From<DirectoryError> for KeyStoreError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::NotFound { .. } => Self::KeyNotFound,
            DirectoryError::ConnectionFailed { message } => Self::ConnectionFailed { message },
            DirectoryError::AccessDenied { message } => Self::AccessDenied { message },
        }
    }
}

impl From<CacheError> for KeyStoreError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::ConnectionFailed { message } => Self::ConnectionFailed { message },
            CacheError::AccessDenied { message } => Self::AccessDenied { message },
        }
    }
}
