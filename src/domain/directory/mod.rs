//! Directory domain - remote organization, teams and account keys

mod client;
mod entity;
mod error;

pub use client::DirectoryClient;
pub use entity::{join_keys, Account, PublicKey, Team, TeamRef};
pub use error::DirectoryError;

#[cfg(test)]
pub use client::MockDirectoryClient;
