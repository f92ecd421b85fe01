//! Application state shared by handlers

use std::sync::Arc;
use std::time::Duration;

use crate::domain::key_store::KeyStore;

#[derive(Clone)]
pub struct AppState {
    /// Full resolution chain, built once at startup
    pub key_store: Arc<dyn KeyStore>,
    pub lookup_timeout: Duration,
}

impl AppState {
    pub fn new(key_store: Arc<dyn KeyStore>, lookup_timeout: Duration) -> Self {
        Self {
            key_store,
            lookup_timeout,
        }
    }
}
