//! Domain layer - Core types and capability traits

pub mod cache;
pub mod directory;
pub mod error;
pub mod key_store;
pub mod provisioning;

pub use cache::{Cache, CacheError};
pub use directory::{Account, DirectoryClient, DirectoryError, PublicKey, Team, TeamRef};
pub use error::DomainError;
pub use key_store::{KeyStore, KeyStoreError};
pub use provisioning::{AccountProvisioner, LocalAccount};
