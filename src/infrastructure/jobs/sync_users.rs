//! Reconciles local accounts with team membership

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::{DirectoryConfig, SyncConfig};
use crate::domain::directory::{DirectoryClient, TeamRef};
use crate::domain::provisioning::{AccountProvisioner, LocalAccount};
use crate::infrastructure::observability::record_sync_account;

/// Outcome of one reconciliation run, by local account name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub created: Vec<String>,
    pub existing: Vec<String>,
    pub failed: Vec<String>,
}

impl SyncReport {
    fn merge(&mut self, other: SyncReport) {
        self.created.extend(other.created);
        self.existing.extend(other.existing);
        self.failed.extend(other.failed);
    }
}

/// A team whose members get local accounts in the given groups
#[derive(Debug, Clone)]
struct TeamAssignment {
    team: TeamRef,
    groups: Vec<String>,
}

/// Creates a local account for every member of the configured teams
pub struct UserSync {
    client: Arc<dyn DirectoryClient>,
    provisioner: Arc<dyn AccountProvisioner>,
    assignments: Vec<TeamAssignment>,
    gid: Option<u32>,
    shell: String,
}

impl UserSync {
    pub fn new(
        client: Arc<dyn DirectoryClient>,
        provisioner: Arc<dyn AccountProvisioner>,
        directory: &DirectoryConfig,
        sync: &SyncConfig,
    ) -> Self {
        let assignments = [
            (&directory.admin_team, &sync.admin_groups),
            (&directory.user_team, &sync.user_groups),
        ]
        .into_iter()
        .filter(|(team, _)| team.is_configured())
        .map(|(team, groups)| TeamAssignment {
            team: team.clone(),
            groups: groups.clone(),
        })
        .collect();

        Self {
            client,
            provisioner,
            assignments,
            gid: sync.gid,
            shell: sync.shell.clone(),
        }
    }

    /// Runs one reconciliation pass; a failing team does not stop the others
    pub async fn run(&self) -> SyncReport {
        let mut report = SyncReport::default();

        for assignment in &self.assignments {
            report.merge(self.sync_team(assignment).await);
        }

        info!(
            created = report.created.len(),
            existing = report.existing.len(),
            failed = report.failed.len(),
            "Account sync finished"
        );

        report
    }

    async fn sync_team(&self, assignment: &TeamAssignment) -> SyncReport {
        let mut report = SyncReport::default();

        let team = match self.client.resolve_team(&assignment.team).await {
            Ok(team) => team,
            Err(e) => {
                error!(team = %assignment.team, error = %e, "Failed to resolve team");
                return report;
            }
        };

        let members = match self.client.list_team_members(&team).await {
            Ok(members) => members,
            Err(e) => {
                error!(team = %team.slug, error = %e, "Failed to list team members");
                return report;
            }
        };

        debug!(team = %team.slug, members = members.len(), "Syncing team members");

        for member in members {
            let account = LocalAccount::new(
                &member.login,
                self.gid,
                assignment.groups.clone(),
                self.shell.clone(),
            );

            let result = match self.provisioner.account_exists(&account.name).await {
                Ok(true) => {
                    debug!(account = %account.name, "Account exists, skipping");
                    report.existing.push(account.name);
                    "existing"
                }
                Ok(false) => match self.provisioner.create_account(&account).await {
                    Ok(()) => {
                        report.created.push(account.name);
                        "created"
                    }
                    Err(e) => {
                        warn!(account = %account.name, error = %e, "Failed to create account");
                        report.failed.push(account.name);
                        "failed"
                    }
                },
                Err(e) => {
                    warn!(account = %account.name, error = %e, "Failed to look up account");
                    report.failed.push(account.name);
                    "failed"
                }
            };

            record_sync_account(&team.slug, result);
        }

        report
    }
}
