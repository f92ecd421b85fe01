//! Directory-backed key store enforcing team membership

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::directory::{join_keys, DirectoryClient, DirectoryError, TeamRef};
use crate::domain::key_store::{KeyStore, KeyStoreError};

/// Authoritative key store: releases an account's keys only when the
/// account belongs to the admin team or the user team.
pub struct DirectoryKeyStore {
    client: Arc<dyn DirectoryClient>,
    admin_team: TeamRef,
    user_team: TeamRef,
}

impl DirectoryKeyStore {
    pub fn new(client: Arc<dyn DirectoryClient>, admin_team: TeamRef, user_team: TeamRef) -> Self {
        Self {
            client,
            admin_team,
            user_team,
        }
    }

    async fn is_member_of(&self, account: &str, team_ref: &TeamRef) -> Result<bool, KeyStoreError> {
        if !team_ref.is_configured() {
            return Ok(false);
        }

        let team = match self.client.resolve_team(team_ref).await {
            Ok(team) => team,
            Err(DirectoryError::NotFound { message }) => {
                warn!(team = %team_ref, %message, "Configured team not found in directory");
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };

        debug!(account = %account, team = %team.slug, "Checking team membership");

        match self.client.is_member(account, &team).await {
            Ok(member) => Ok(member),
            // Only the organization lookup can 404 here
            Err(DirectoryError::NotFound { message }) => Err(KeyStoreError::access_denied(message)),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl KeyStore for DirectoryKeyStore {
    async fn get(&self, account: &str) -> Result<String, KeyStoreError> {
        debug!(account = %account, "Starting directory lookup");

        let member = self.is_member_of(account, &self.admin_team).await?
            || self.is_member_of(account, &self.user_team).await?;

        if !member {
            debug!(account = %account, "No team membership");
            return Ok(String::new());
        }

        let keys = self.client.list_keys(account).await?;
        debug!(account = %account, count = keys.len(), "Fetched keys");

        Ok(join_keys(&keys))
    }

    fn name(&self) -> &'static str {
        "directory"
    }
}
