//! Serve command - account sync scheduler plus the HTTP lookup server

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::api::{create_router, AppState};
use crate::config::AppConfig;
use crate::infrastructure::jobs::{spawn_periodic_sync, SshIntegration, UserSync};
use crate::infrastructure::key_store::build_key_store;
use crate::infrastructure::observability::{create_metrics_router, init_metrics};
use crate::infrastructure::provisioning::LinuxProvisioner;

/// Run the sync scheduler and the lookup server until the process exits
pub async fn run(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = super::bootstrap(config_path)?;
    let client = super::directory_client(&config)?;
    let metrics = metrics_router(&config);

    let _sync_task = if config.sync.enabled {
        let sync = Arc::new(UserSync::new(
            client.clone(),
            Arc::new(LinuxProvisioner::new(&config.sync.root)),
            &config.directory,
            &config.sync,
        ));

        info!("Running account sync on start");
        sync.run().await;

        spawn_periodic_sync(sync, std::time::Duration::from_secs(config.sync.interval_secs))
    } else {
        None
    };

    if config.ssh.integrate {
        let integration =
            SshIntegration::new(config.ssh.clone(), &config.sync.root, config.server.port);

        if let Err(e) = integration.run().await {
            error!(error = %e, "sshd integration failed");
        }
    }

    let key_store = build_key_store(&config, client)?;

    let app = create_router(
        AppState::new(key_store, config.server.lookup_timeout()),
        metrics,
    );

    let addr = build_socket_addr(&config)?;
    info!("Starting lookup server on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Installs the global recorder; must run before anything records metrics
fn metrics_router(config: &AppConfig) -> Option<Router> {
    init_metrics(&config.metrics).map(|metrics| create_metrics_router(metrics, &config.metrics.path))
}

fn build_socket_addr(config: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_socket_addr() {
        let mut config = AppConfig::default();
        assert_eq!(
            build_socket_addr(&config).unwrap(),
            "0.0.0.0:301".parse::<SocketAddr>().unwrap()
        );

        config.server.host = "::1".to_string();
        config.server.port = 8080;
        assert_eq!(
            build_socket_addr(&config).unwrap(),
            "[::1]:8080".parse::<SocketAddr>().unwrap()
        );

        config.server.host = "localhost".to_string();
        assert!(build_socket_addr(&config).is_err());
    }

    #[test]
    fn test_metrics_router_absent_when_disabled() {
        let mut config = AppConfig::default();
        config.metrics.enabled = false;

        assert!(metrics_router(&config).is_none());
    }
}
