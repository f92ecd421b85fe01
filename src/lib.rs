//! github-authorized-keys
//!
//! Serves SSH authorized keys for members of GitHub organization teams:
//! - Membership-checked key lookup against the GitHub API
//! - Cache fallback (in-memory or redis) when GitHub is unreachable
//! - Local account provisioning for team members
//! - sshd `AuthorizedKeysCommand` integration

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
