//! Local accounts managed through `/etc/passwd` and `useradd`

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::domain::provisioning::{AccountProvisioner, LocalAccount};
use crate::domain::DomainError;

/// Provisions accounts on the Linux system found under `root`
#[derive(Debug, Clone)]
pub struct LinuxProvisioner {
    root: PathBuf,
}

impl LinuxProvisioner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn etc_file(&self, name: &str) -> PathBuf {
        self.root.join("etc").join(name)
    }

    async fn read_etc_file(&self, name: &str) -> Result<String, DomainError> {
        let path = self.etc_file(name);

        tokio::fs::read_to_string(&path).await.map_err(|e| {
            DomainError::internal(format!("failed to read {}: {}", path.display(), e))
        })
    }

    /// Keeps the supplementary groups that exist in `<root>/etc/group`
    async fn existing_groups(&self, groups: &[String]) -> Result<Vec<String>, DomainError> {
        if groups.is_empty() {
            return Ok(Vec::new());
        }

        let contents = self.read_etc_file("group").await?;
        let known = first_fields(&contents);

        Ok(groups
            .iter()
            .filter(|group| {
                let exists = known.contains(&group.as_str());
                if !exists {
                    warn!(group = %group, "Supplementary group does not exist, skipping");
                }
                exists
            })
            .cloned()
            .collect())
    }
}

/// Names in the first column of a passwd(5) or group(5) formatted file
fn first_fields(contents: &str) -> Vec<&str> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split(':').next())
        .collect()
}

/// Arguments for `useradd` creating `account` under `root`
pub fn useradd_args(account: &LocalAccount, groups: &[String], root: &Path) -> Vec<String> {
    let mut args = vec![
        "--create-home".to_string(),
        "--shell".to_string(),
        account.shell.clone(),
    ];

    if let Some(gid) = account.gid {
        args.push("--gid".to_string());
        args.push(gid.to_string());
    }

    if !groups.is_empty() {
        args.push("--groups".to_string());
        args.push(groups.join(","));
    }

    if root != Path::new("/") {
        args.push("--root".to_string());
        args.push(root.display().to_string());
    }

    args.push(account.name.clone());
    args
}

#[async_trait]
impl AccountProvisioner for LinuxProvisioner {
    async fn account_exists(&self, name: &str) -> Result<bool, DomainError> {
        let contents = self.read_etc_file("passwd").await?;

        Ok(first_fields(&contents).contains(&name))
    }

    async fn create_account(&self, account: &LocalAccount) -> Result<(), DomainError> {
        let groups = self.existing_groups(&account.groups).await?;
        let args = useradd_args(account, &groups, &self.root);

        debug!(account = %account.name, ?args, "Running useradd");

        let output = Command::new("useradd")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                DomainError::provisioning(&account.name, format!("failed to spawn useradd: {}", e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DomainError::provisioning(
                &account.name,
                format!("useradd failed ({}): {}", output.status, stderr.trim()),
            ));
        }

        info!(account = %account.name, groups = ?groups, "Created local account");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASSWD: &str = "\
root:x:0:0:root:/root:/bin/bash
# comment line
daemon:x:1:1:daemon:/usr/sbin:/usr/sbin/nologin
alice:x:1000:1000::/home/alice:/bin/bash
";

    const GROUP: &str = "\
root:x:0:
wheel:x:10:alice
docker:x:998:
";

    struct FakeRoot(PathBuf);

    impl FakeRoot {
        fn new() -> Self {
            let root = std::env::temp_dir().join(format!("gak-{}", uuid::Uuid::new_v4()));
            std::fs::create_dir_all(root.join("etc")).unwrap();
            std::fs::write(root.join("etc/passwd"), PASSWD).unwrap();
            std::fs::write(root.join("etc/group"), GROUP).unwrap();
            Self(root)
        }
    }

    impl Drop for FakeRoot {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    fn account(groups: &[&str], gid: Option<u32>) -> LocalAccount {
        LocalAccount::new(
            "Bob",
            gid,
            groups.iter().map(|g| g.to_string()).collect(),
            "/bin/zsh",
        )
    }

    #[tokio::test]
    async fn test_account_exists() {
        let root = FakeRoot::new();
        let provisioner = LinuxProvisioner::new(&root.0);

        assert!(provisioner.account_exists("root").await.unwrap());
        assert!(provisioner.account_exists("alice").await.unwrap());
        assert!(!provisioner.account_exists("bob").await.unwrap());
        assert!(!provisioner.account_exists("# comment line").await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_passwd_is_an_error() {
        let provisioner = LinuxProvisioner::new(
            std::env::temp_dir().join(format!("gak-missing-{}", uuid::Uuid::new_v4())),
        );

        assert!(matches!(
            provisioner.account_exists("root").await,
            Err(DomainError::Internal { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_groups_are_skipped() {
        let root = FakeRoot::new();
        let provisioner = LinuxProvisioner::new(&root.0);

        let groups = provisioner
            .existing_groups(&["wheel".to_string(), "ghosts".to_string(), "docker".to_string()])
            .await
            .unwrap();

        assert_eq!(groups, vec!["wheel".to_string(), "docker".to_string()]);
    }

    #[test]
    fn test_useradd_args_minimal() {
        let args = useradd_args(&account(&[], None), &[], Path::new("/"));

        assert_eq!(args, vec!["--create-home", "--shell", "/bin/zsh", "bob"]);
    }

    #[test]
    fn test_useradd_args_full() {
        let account = account(&["wheel", "docker"], Some(999));
        let args = useradd_args(&account, &account.groups, Path::new("/mnt/host"));

        assert_eq!(
            args,
            vec![
                "--create-home",
                "--shell",
                "/bin/zsh",
                "--gid",
                "999",
                "--groups",
                "wheel,docker",
                "--root",
                "/mnt/host",
                "bob",
            ]
        );
    }

    #[test]
    fn test_first_fields() {
        assert_eq!(first_fields(GROUP), vec!["root", "wheel", "docker"]);
        assert!(first_fields("").is_empty());
    }
}
