//! Key store implementations and the fallback chain

mod cache_store;
mod directory_store;
mod factory;
mod fallback;
mod null_store;

pub use cache_store::CacheKeyStore;
pub use directory_store::DirectoryKeyStore;
pub use factory::build_key_store;
pub use fallback::FallbackKeyStore;
pub use null_store::NullKeyStore;
