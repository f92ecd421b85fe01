//! GitHub REST implementation of the directory client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, LINK, USER_AGENT};
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use super::pagination::next_link;
use crate::config::DirectoryConfig;
use crate::domain::directory::{
    Account, DirectoryClient, DirectoryError, PublicKey, Team, TeamRef,
};
use crate::domain::DomainError;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Settings for [`GithubDirectoryClient`]
#[derive(Clone)]
pub struct GithubClientConfig {
    pub api_url: String,
    pub token: String,
    pub organization: String,
    pub page_size: u32,
    pub connect_timeout: Duration,
}

impl From<&DirectoryConfig> for GithubClientConfig {
    fn from(config: &DirectoryConfig) -> Self {
        Self {
            api_url: config.api_url.clone(),
            token: config.token.clone(),
            organization: config.organization.clone(),
            page_size: config.page_size,
            connect_timeout: config.connect_timeout(),
        }
    }
}

/// How a non-success page status is reported
#[derive(Debug, Clone, Copy)]
enum StatusPolicy {
    /// 404 becomes `NotFound`, anything else `AccessDenied`
    NotFoundDistinct,
    /// Every non-success status is `AccessDenied`
    DenyAll,
}

struct Page<T> {
    items: Vec<T>,
    next: Option<String>,
}

#[derive(Deserialize)]
struct Organization {
    id: u64,
}

/// Directory client for a GitHub (or GitHub Enterprise) organization.
///
/// The organization id is fetched on first use and kept for the lifetime of
/// the client. The underlying `reqwest::Client` is shared by all callers.
pub struct GithubDirectoryClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
    organization: String,
    page_size: u32,
    organization_id: OnceCell<u64>,
}

impl std::fmt::Debug for GithubDirectoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubDirectoryClient")
            .field("base_url", &self.base_url.as_str())
            .field("organization", &self.organization)
            .field("page_size", &self.page_size)
            .field("organization_id", &self.organization_id.get())
            .finish()
    }
}

impl GithubDirectoryClient {
    pub fn new(config: GithubClientConfig) -> Result<Self, DomainError> {
        let base_url = Url::parse(&config.api_url).map_err(|e| {
            DomainError::configuration(format!("Invalid directory api_url '{}': {}", config.api_url, e))
        })?;

        if base_url.cannot_be_a_base() {
            return Err(DomainError::configuration(format!(
                "Directory api_url '{}' cannot be a base URL",
                config.api_url
            )));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            token: config.token,
            organization: config.organization,
            page_size: config.page_size.max(1),
            organization_id: OnceCell::new(),
        })
    }

    /// Builds `<api_url>/<segments...>`, percent-encoding every segment
    fn endpoint(&self, segments: &[&str], paginated: bool) -> Url {
        let mut url = self.base_url.clone();

        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }

        if paginated {
            url.query_pairs_mut()
                .append_pair("per_page", &self.page_size.to_string());
        }

        url
    }

    /// Sends an authenticated GET; transport failures become `ConnectionFailed`
    async fn send(&self, url: &str) -> Result<Response, DirectoryError> {
        self.http
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(USER_AGENT, concat!("github-authorized-keys/", env!("CARGO_PKG_VERSION")))
            .header("X-GitHub-Api-Version", "2022-11-28")
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "Directory request failed");
                DirectoryError::connection_failed(format!("Request to {} failed: {}", url, e))
            })
    }

    async fn decode<T: DeserializeOwned>(response: Response, url: &str) -> Result<T, DirectoryError> {
        response.json::<T>().await.map_err(|e| {
            warn!(url = %url, error = %e, "Malformed directory response");
            DirectoryError::connection_failed(format!("Malformed response from {}: {}", url, e))
        })
    }

    fn status_error(status: StatusCode, response: &Response, url: &str, policy: StatusPolicy) -> DirectoryError {
        let remaining = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("?");

        debug!(url = %url, status = %status, rate_limit_remaining = remaining, "Directory returned non-success");

        match (policy, status) {
            (StatusPolicy::NotFoundDistinct, StatusCode::NOT_FOUND) => {
                DirectoryError::not_found(format!("{} returned 404", url))
            }
            _ => DirectoryError::access_denied(format!("{} returned {}", url, status)),
        }
    }

    /// Fetches and classifies one page of a list endpoint
    async fn fetch_page<T: DeserializeOwned>(
        &self,
        url: &str,
        policy: StatusPolicy,
    ) -> Result<Page<T>, DirectoryError> {
        let response = self.send(url).await?;
        let status = response.status();

        if !status.is_success() {
            return Err(Self::status_error(status, &response, url, policy));
        }

        let next = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(next_link);

        let items = Self::decode::<Vec<T>>(response, url).await?;

        Ok(Page { items, next })
    }

    /// Walks every page starting at `first`, collecting all items
    async fn fetch_all<T: DeserializeOwned>(
        &self,
        first: Url,
        policy: StatusPolicy,
    ) -> Result<Vec<T>, DirectoryError> {
        let mut items = Vec::new();
        let mut next = Some(first.to_string());

        while let Some(url) = next {
            let page = self.fetch_page::<T>(&url, policy).await?;
            items.extend(page.items);
            next = page.next;
        }

        Ok(items)
    }

    fn team_endpoint(&self, org_id: u64, team: &Team, tail: &[&str], paginated: bool) -> Url {
        let org_id = org_id.to_string();
        let team_id = team.id.to_string();
        let mut segments = vec!["organizations", org_id.as_str(), "team", team_id.as_str()];
        segments.extend_from_slice(tail);

        self.endpoint(&segments, paginated)
    }
}

#[async_trait]
impl DirectoryClient for GithubDirectoryClient {
    async fn resolve_team(&self, team_ref: &TeamRef) -> Result<Team, DirectoryError> {
        if !team_ref.is_configured() {
            return Err(DirectoryError::not_found("empty team reference"));
        }

        let first = self.endpoint(&["orgs", &self.organization, "teams"], true);
        let mut next = Some(first.to_string());

        while let Some(url) = next {
            let page = self.fetch_page::<Team>(&url, StatusPolicy::DenyAll).await?;

            if let Some(team) = page.items.into_iter().find(|t| t.matches(team_ref)) {
                debug!(team = %team.slug, id = team.id, "Resolved team");
                return Ok(team);
            }

            next = page.next;
        }

        Err(DirectoryError::not_found(format!(
            "No team matching {} in organization {}",
            team_ref, self.organization
        )))
    }

    async fn is_member(&self, account: &str, team: &Team) -> Result<bool, DirectoryError> {
        let org_id = self.organization_id().await?;
        let url = self.team_endpoint(org_id, team, &["memberships", account], false);

        let response = self.send(url.as_str()).await?;
        let status = response.status();

        if status.is_success() {
            return Ok(true);
        }

        match status {
            StatusCode::NOT_FOUND => Ok(false),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => Err(
                Self::status_error(status, &response, url.as_str(), StatusPolicy::DenyAll),
            ),
            _ => {
                debug!(account = %account, team = %team.slug, status = %status, "Unknown membership status, treating as non-member");
                Ok(false)
            }
        }
    }

    async fn list_keys(&self, account: &str) -> Result<Vec<PublicKey>, DirectoryError> {
        let first = self.endpoint(&["users", account, "keys"], true);

        self.fetch_all(first, StatusPolicy::NotFoundDistinct).await
    }

    async fn list_team_members(&self, team: &Team) -> Result<Vec<Account>, DirectoryError> {
        let org_id = self.organization_id().await?;
        let first = self.team_endpoint(org_id, team, &["members"], true);

        self.fetch_all(first, StatusPolicy::DenyAll).await
    }

    async fn organization_id(&self) -> Result<u64, DirectoryError> {
        let id = self
            .organization_id
            .get_or_try_init(|| async {
                let url = self.endpoint(&["orgs", &self.organization], false);
                let response = self.send(url.as_str()).await?;
                let status = response.status();

                if !status.is_success() {
                    return Err(Self::status_error(
                        status,
                        &response,
                        url.as_str(),
                        StatusPolicy::NotFoundDistinct,
                    ));
                }

                let org = Self::decode::<Organization>(response, url.as_str()).await?;
                debug!(organization = %self.organization, id = org.id, "Resolved organization id");
                Ok(org.id)
            })
            .await?;

        Ok(*id)
    }
}
