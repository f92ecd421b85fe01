//! Account provisioner trait

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::LocalAccount;
use crate::domain::DomainError;

/// Creates and queries local OS accounts
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AccountProvisioner: Send + Sync {
    /// Whether a local account with this name exists
    async fn account_exists(&self, name: &str) -> Result<bool, DomainError>;

    /// Creates the account with its shell and groups
    async fn create_account(&self, account: &LocalAccount) -> Result<(), DomainError>;
}
