use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::{DomainError, TeamRef};
use crate::infrastructure::cache::CacheType;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
    pub directory: DirectoryConfig,
    pub cache: CacheConfig,
    pub sync: SyncConfig,
    pub ssh: SshConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on a single key lookup served over HTTP
    pub lookup_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Prometheus metrics configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub path: String,
}

/// GitHub organization and the teams whose members get access
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    pub api_url: String,
    pub token: String,
    pub organization: String,
    pub page_size: u32,
    pub connect_timeout_secs: u64,
    pub admin_team: TeamRef,
    pub user_team: TeamRef,
}

/// Durable key cache used when the directory is unreachable
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheType,
    pub endpoints: Vec<String>,
    pub prefix: String,
    pub ttl_secs: u64,
    /// Capacity of the in-memory backend
    pub max_entries: u64,
}

/// Local account reconciliation
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub enabled: bool,
    /// Seconds between runs; 0 runs once at startup only
    pub interval_secs: u64,
    pub admin_groups: Vec<String>,
    pub user_groups: Vec<String>,
    pub shell: String,
    pub root: String,
    pub gid: Option<u32>,
}

/// sshd `AuthorizedKeysCommand` wiring
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SshConfig {
    pub integrate: bool,
    pub command_path: String,
    pub sshd_config: String,
    pub command_user: String,
    pub restart_command: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 301,
            lookup_timeout_secs: 10,
        }
    }
}

impl ServerConfig {
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            token: String::new(),
            organization: String::new(),
            page_size: 100,
            connect_timeout_secs: 10,
            admin_team: TeamRef::default(),
            user_team: TeamRef::default(),
        }
    }
}

// Keeps the token out of logs
impl std::fmt::Debug for DirectoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryConfig")
            .field("api_url", &self.api_url)
            .field("token", &mask(&self.token))
            .field("organization", &self.organization)
            .field("page_size", &self.page_size)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("admin_team", &self.admin_team)
            .field("user_team", &self.user_team)
            .finish()
    }
}

impl DirectoryConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheType::default(),
            endpoints: Vec::new(),
            prefix: "github-authorized-keys".to_string(),
            ttl_secs: 24 * 60 * 60,
            max_entries: 10_000,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 5 * 60,
            admin_groups: Vec::new(),
            user_groups: Vec::new(),
            shell: "/bin/bash".to_string(),
            root: "/".to_string(),
            gid: None,
        }
    }
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            integrate: false,
            command_path: "/usr/bin/github-authorized-keys".to_string(),
            sshd_config: "/etc/ssh/sshd_config".to_string(),
            command_user: "nobody".to_string(),
            restart_command: "/usr/sbin/service ssh force-reload".to_string(),
        }
    }
}

/// Replaces all but the last four characters with `*`
pub fn mask(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let visible = chars.len().min(4);
    let hidden = chars.len() - visible;

    "*".repeat(hidden) + &chars[hidden..].iter().collect::<String>()
}

impl AppConfig {
    /// Loads configuration from files and `APP__`-prefixed environment variables
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false));

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cache.endpoints")
                    .with_list_parse_key("sync.admin_groups")
                    .with_list_parse_key("sync.user_groups")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Checks the settings every command depends on
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.directory.token.is_empty() {
            return Err(DomainError::configuration("directory.token is required"));
        }

        if self.directory.organization.is_empty() {
            return Err(DomainError::configuration(
                "directory.organization is required",
            ));
        }

        if !self.directory.admin_team.is_configured() && !self.directory.user_team.is_configured() {
            return Err(DomainError::configuration(
                "either an admin team or a user team (name or id) is required",
            ));
        }

        if self.directory.page_size == 0 {
            return Err(DomainError::configuration(
                "directory.page_size must be greater than zero",
            ));
        }

        if self.cache.ttl_secs == 0 {
            return Err(DomainError::configuration(
                "cache.ttl_secs must be greater than zero",
            ));
        }

        if self.cache.backend == CacheType::Redis && self.cache.endpoints.is_empty() {
            return Err(DomainError::configuration(
                "cache.endpoints is required for the redis backend",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.directory.token = "ghp_secret1234".to_string();
        config.directory.organization = "acme".to_string();
        config.directory.admin_team = TeamRef::by_name("admins");
        config
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 301);
        assert_eq!(config.directory.page_size, 100);
        assert_eq!(config.directory.api_url, "https://api.github.com");
        assert_eq!(config.cache.backend, CacheType::None);
        assert_eq!(config.cache.ttl(), Duration::from_secs(86_400));
        assert_eq!(config.sync.interval_secs, 300);
        assert_eq!(config.sync.shell, "/bin/bash");
        assert!(!config.ssh.integrate);
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_token_required() {
        let mut config = valid_config();
        config.directory.token.clear();

        assert!(matches!(
            config.validate(),
            Err(DomainError::Configuration { .. })
        ));
    }

    #[test]
    fn test_organization_required() {
        let mut config = valid_config();
        config.directory.organization.clear();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_team_required() {
        let mut config = valid_config();
        config.directory.admin_team = TeamRef::default();
        assert!(config.validate().is_err());

        config.directory.user_team = TeamRef::by_id(42);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ttl_must_be_positive() {
        let mut config = valid_config();
        config.cache.ttl_secs = 0;
        assert!(config.validate().is_err());

        config.cache.ttl_secs = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_redis_requires_endpoints() {
        let mut config = valid_config();
        config.cache.backend = CacheType::Redis;
        assert!(config.validate().is_err());

        config.cache.endpoints = vec!["redis://127.0.0.1:6379".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask("ghp_secret1234"), "**********1234");
        assert_eq!(mask("abc"), "abc");
        assert_eq!(mask(""), "");
    }

    #[test]
    fn test_debug_masks_token() {
        let rendered = format!("{:?}", valid_config().directory);

        assert!(!rendered.contains("ghp_secret1234"));
        assert!(rendered.contains("1234"));
    }

    #[test]
    fn test_deserialize_partial_toml() {
        let raw = r#"
            [directory]
            token = "t"
            organization = "acme"
            admin_team = { name = "admins" }
            user_team = { id = 7 }

            [cache]
            backend = "redis"
            endpoints = ["redis://cache:6379"]
        "#;

        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.directory.admin_team, TeamRef::by_name("admins"));
        assert_eq!(config.directory.user_team, TeamRef::by_id(7));
        assert_eq!(config.cache.backend, CacheType::Redis);
        assert_eq!(config.cache.prefix, "github-authorized-keys");
        assert_eq!(config.server.port, 301);
        assert!(config.validate().is_ok());
    }
}
