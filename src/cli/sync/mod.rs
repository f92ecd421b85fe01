//! Sync command - reconcile local accounts once

use std::path::Path;
use std::sync::Arc;

use crate::infrastructure::jobs::UserSync;
use crate::infrastructure::provisioning::LinuxProvisioner;

/// Run one reconciliation pass; fails when any account could not be created
pub async fn run(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = super::bootstrap(config_path)?;
    let client = super::directory_client(&config)?;

    let sync = UserSync::new(
        client,
        Arc::new(LinuxProvisioner::new(&config.sync.root)),
        &config.directory,
        &config.sync,
    );

    let report = sync.run().await;

    if !report.failed.is_empty() {
        anyhow::bail!("failed to provision accounts: {}", report.failed.join(", "));
    }

    Ok(())
}
