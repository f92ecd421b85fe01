//! Key store domain - the layered key resolution abstraction

mod error;
mod store;

pub use error::KeyStoreError;
pub use store::KeyStore;

#[cfg(test)]
pub use store::MockKeyStore;
