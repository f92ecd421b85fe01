//! Cache domain - durable key/value abstraction with per-entry TTL

mod repository;

pub use repository::{Cache, CacheError};

#[cfg(test)]
pub use repository::mock::MockCache;
