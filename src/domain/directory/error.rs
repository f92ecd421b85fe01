use thiserror::Error;

/// Outcomes of a failed directory call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// Transport failure or a malformed/absent response
    #[error("Connection to directory failed: {message}")]
    ConnectionFailed { message: String },

    /// Non-success response other than 404
    #[error("Access denied: {message}")]
    AccessDenied { message: String },

    /// Explicit 404, or no match after walking every page
    #[error("Not found: {message}")]
    NotFound { message: String },
}

impl DirectoryError {
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

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }
}
