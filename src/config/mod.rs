mod app_config;

pub use app_config::{
    mask, AppConfig, CacheConfig, DirectoryConfig, LogFormat, LoggingConfig, MetricsConfig,
    ServerConfig, SshConfig, SyncConfig,
};
