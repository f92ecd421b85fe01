//! CLI module for github-authorized-keys
//!
//! Provides subcommands:
//! - `serve`: account sync scheduler + HTTP lookup server (default)
//! - `sync`: reconcile local accounts once and exit
//! - `lookup`: print one account's keys, usable as `AuthorizedKeysCommand`

pub mod lookup;
pub mod serve;
pub mod sync;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::AppConfig;
use crate::domain::directory::DirectoryClient;
use crate::infrastructure::directory::{GithubClientConfig, GithubDirectoryClient};
use crate::infrastructure::logging;

/// Resolve SSH authorized keys from GitHub team membership
#[derive(Parser)]
#[command(name = "github-authorized-keys")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file layered over config/default and config/local
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the account sync scheduler and the HTTP lookup server
    Serve,

    /// Reconcile local accounts with team membership once
    Sync,

    /// Print the authorized keys of one account
    Lookup {
        /// Local account name
        account: String,
    },
}

/// Loads, logs and validates configuration shared by every subcommand
fn bootstrap(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load(path)?;
    logging::init_logging(&config.logging);

    info!(directory = ?config.directory, cache = ?config.cache, "Configuration loaded");
    config.validate()?;

    Ok(config)
}

fn directory_client(config: &AppConfig) -> anyhow::Result<Arc<dyn DirectoryClient>> {
    let client = GithubDirectoryClient::new(GithubClientConfig::from(&config.directory))?;
    Ok(Arc::new(client))
}
