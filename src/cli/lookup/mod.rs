//! Lookup command - print one account's keys on stdout

use std::io::Write;
use std::path::Path;

use crate::infrastructure::key_store::build_key_store;

/// Resolve `account` through the full key store chain.
///
/// sshd treats a non-zero exit as "no keys", matching the 404 the HTTP
/// endpoint answers.
pub async fn run(config_path: Option<&Path>, account: &str) -> anyhow::Result<()> {
    let config = super::bootstrap(config_path)?;
    let client = super::directory_client(&config)?;
    let key_store = build_key_store(&config, client)?;

    let keys = key_store.get(&account.to_lowercase()).await?;

    let mut stdout = std::io::stdout().lock();
    if !keys.is_empty() {
        writeln!(stdout, "{}", keys)?;
    }
    stdout.flush()?;

    Ok(())
}
