//! Wires the lookup endpoint into sshd as its `AuthorizedKeysCommand`

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use regex::Regex;
use tokio::process::Command;
use tracing::{error, info};

use crate::config::SshConfig;
use crate::domain::DomainError;

/// Script sshd runs to fetch an account's keys from the local server
pub fn wrapper_script(port: u16) -> String {
    format!(
        "#!/bin/bash\ncurl -sf \"http://localhost:{}/user/$1/authorized_keys\"\n",
        port
    )
}

/// Sets `directive value` in an sshd_config body, replacing existing
/// directive lines or appending one when absent
pub fn ensure_directive(contents: &str, directive: &str, value: &str) -> Result<String, DomainError> {
    let pattern = Regex::new(&format!(r"(?m)^{}(?:[ \t].*)?$", regex::escape(directive)))
        .map_err(|e| DomainError::internal(e.to_string()))?;
    let line = format!("{} {}", directive, value);

    if pattern.is_match(contents) {
        return Ok(pattern.replace_all(contents, regex::NoExpand(&line)).into_owned());
    }

    let mut updated = contents.to_string();
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(&line);
    updated.push('\n');

    Ok(updated)
}

/// Resolves an absolute path inside `root`
fn rooted(root: &Path, path: &str) -> PathBuf {
    root.join(path.trim_start_matches('/'))
}

/// Installs the wrapper script, updates sshd_config and reloads sshd
pub struct SshIntegration {
    config: SshConfig,
    root: PathBuf,
    port: u16,
}

impl SshIntegration {
    pub fn new(config: SshConfig, root: impl Into<PathBuf>, port: u16) -> Self {
        Self {
            config,
            root: root.into(),
            port,
        }
    }

    pub async fn run(&self) -> Result<(), DomainError> {
        self.install_wrapper().await?;
        self.update_sshd_config().await?;
        self.restart_sshd().await;
        Ok(())
    }

    async fn install_wrapper(&self) -> Result<(), DomainError> {
        let path = rooted(&self.root, &self.config.command_path);
        info!(path = %path.display(), "Installing authorized keys command");

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, wrapper_script(self.port)).await?;
        tokio::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).await?;

        Ok(())
    }

    async fn update_sshd_config(&self) -> Result<(), DomainError> {
        let path = rooted(&self.root, &self.config.sshd_config);

        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        let updated = ensure_directive(&contents, "AuthorizedKeysCommand", &self.config.command_path)?;
        let updated = ensure_directive(&updated, "AuthorizedKeysCommandUser", &self.config.command_user)?;

        if updated != contents {
            info!(path = %path.display(), "Updating sshd_config");
            tokio::fs::write(&path, updated).await?;
        }

        Ok(())
    }

    async fn restart_sshd(&self) {
        info!(command = %self.config.restart_command, "Reloading sshd");

        let output = Command::new("sh")
            .arg("-c")
            .arg(&self.config.restart_command)
            .stdin(Stdio::null())
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => {
                info!(output = %String::from_utf8_lossy(&output.stdout).trim(), "sshd reloaded");
            }
            Ok(output) => {
                error!(
                    status = %output.status,
                    stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                    "sshd reload failed"
                );
            }
            Err(e) => error!(error = %e, "Failed to run sshd reload command"),
        }
    }
}
