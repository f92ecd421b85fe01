//! Infrastructure layer - implementations of domain traits

pub mod cache;
pub mod directory;
pub mod jobs;
pub mod key_store;
pub mod logging;
pub mod observability;
pub mod provisioning;
