//! Directory client trait

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::{Account, DirectoryError, PublicKey, Team, TeamRef};

/// Read-only view of the remote organization's team/account graph.
///
/// Every list operation walks all pages. Implementations must be safe to
/// share between concurrent requests.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Finds a team by slug or id across every page of the organization's teams
    async fn resolve_team(&self, team_ref: &TeamRef) -> Result<Team, DirectoryError>;

    /// Direct membership test; "no such membership" is `Ok(false)`
    async fn is_member(&self, account: &str, team: &Team) -> Result<bool, DirectoryError>;

    /// All public keys registered to `account`, in directory order
    async fn list_keys(&self, account: &str) -> Result<Vec<PublicKey>, DirectoryError>;

    /// Every member of `team`
    async fn list_team_members(&self, team: &Team) -> Result<Vec<Account>, DirectoryError>;

    /// Numeric id of the organization, resolved once and reused
    async fn organization_id(&self) -> Result<u64, DirectoryError>;
}
