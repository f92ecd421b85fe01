//! Redis cache implementation

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, ErrorKind, RedisError, RedisResult};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::cache::{Cache, CacheError};

/// Configuration for Redis cache
#[derive(Debug, Clone)]
pub struct RedisCacheConfig {
    /// Redis connection URLs, tried in order (e.g., "redis://127.0.0.1:6379")
    pub endpoints: Vec<String>,
    /// Key prefix for namespacing
    pub key_prefix: Option<String>,
    /// Connection timeout per endpoint
    pub connection_timeout: Duration,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            endpoints: vec!["redis://127.0.0.1:6379".to_string()],
            key_prefix: None,
            connection_timeout: Duration::from_secs(5),
        }
    }
}

impl RedisCacheConfig {
    /// Creates a new configuration with the given endpoints
    pub fn new(endpoints: Vec<String>) -> Self {
        Self {
            endpoints,
            ..Default::default()
        }
    }

    /// Sets the key prefix
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Sets the connection timeout
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }
}

/// Redis cache implementation.
///
/// Connects lazily to the first reachable endpoint, so an unreachable cache
/// at startup only surfaces as `ConnectionFailed` on the lookups that need
/// it. A connection-level failure drops the active connection and retries
/// the command once on the next reachable endpoint. `SET EX` makes each
/// write atomic.
pub struct RedisCache {
    clients: Vec<Client>,
    state: Mutex<ConnectionState>,
    config: RedisCacheConfig,
}

#[derive(Default)]
struct ConnectionState {
    active: Option<ActiveConnection>,
    /// Endpoint tried first on the next connect
    next: usize,
}

struct ActiveConnection {
    index: usize,
    manager: ConnectionManager,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("config", &self.config)
            .finish()
    }
}

/// Endpoint indexes in connect order, starting at `first` and wrapping
fn endpoint_order(first: usize, count: usize) -> impl Iterator<Item = usize> {
    (0..count).map(move |offset| (first + offset) % count)
}

fn is_connection_error(e: &RedisError) -> bool {
    e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() || e.is_timeout()
}

impl RedisCache {
    /// Creates a Redis cache; only URL parsing happens here
    pub fn new(config: RedisCacheConfig) -> Result<Self, CacheError> {
        if config.endpoints.is_empty() {
            return Err(CacheError::connection_failed("no Redis endpoints configured"));
        }

        let clients = config
            .endpoints
            .iter()
            .map(|url| {
                Client::open(url.as_str()).map_err(|e| {
                    CacheError::connection_failed(format!("Invalid Redis endpoint '{}': {}", url, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            clients,
            state: Mutex::new(ConnectionState::default()),
            config,
        })
    }

    /// Returns the active connection, connecting if there is none
    async fn connection(&self) -> Result<(usize, ConnectionManager), CacheError> {
        let mut state = self.state.lock().await;

        if let Some(active) = &state.active {
            return Ok((active.index, active.manager.clone()));
        }

        let mut last_error = CacheError::connection_failed("no Redis endpoints configured");

        for index in endpoint_order(state.next, self.clients.len()) {
            let url = &self.config.endpoints[index];
            let attempt = tokio::time::timeout(
                self.config.connection_timeout,
                ConnectionManager::new(self.clients[index].clone()),
            )
            .await;

            match attempt {
                Ok(Ok(manager)) => {
                    debug!(endpoint = %url, "Connected to Redis");
                    state.active = Some(ActiveConnection {
                        index,
                        manager: manager.clone(),
                    });
                    return Ok((index, manager));
                }
                Ok(Err(e)) => {
                    warn!(endpoint = %url, error = %e, "Redis endpoint unavailable");
                    last_error = map_redis_error(e);
                }
                Err(_) => {
                    warn!(endpoint = %url, "Redis connection timed out");
                    last_error =
                        CacheError::connection_failed(format!("Connection to '{}' timed out", url));
                }
            }
        }

        Err(last_error)
    }

    /// Drops the connection to endpoint `index` so the next connect starts
    /// at the endpoint after it
    async fn fail_over(&self, index: usize) {
        let mut state = self.state.lock().await;

        if state.active.as_ref().is_some_and(|active| active.index == index) {
            warn!(endpoint = %self.config.endpoints[index], "Dropping Redis connection");
            state.active = None;
            state.next = (index + 1) % self.clients.len();
        }
    }

    /// Runs `command`, retrying once on another endpoint after a
    /// connection-level failure
    async fn execute<T, F, Fut>(&self, command: F) -> Result<T, CacheError>
    where
        F: Fn(ConnectionManager) -> Fut,
        Fut: Future<Output = RedisResult<T>>,
    {
        let (index, conn) = self.connection().await?;

        match command(conn).await {
            Ok(value) => Ok(value),
            Err(e) if is_connection_error(&e) => {
                self.fail_over(index).await;
                let (_, conn) = self.connection().await?;
                command(conn).await.map_err(map_redis_error)
            }
            Err(e) => Err(map_redis_error(e)),
        }
    }

    fn prefix_key(&self, key: &str) -> String {
        match &self.config.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }
}

fn map_redis_error(e: RedisError) -> CacheError {
    if e.kind() == ErrorKind::AuthenticationFailed || e.code() == Some("NOPERM") {
        CacheError::access_denied(e.to_string())
    } else {
        CacheError::connection_failed(e.to_string())
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let prefixed_key = self.prefix_key(key);

        self.execute(|mut conn| {
            let key = prefixed_key.clone();
            async move { conn.get::<_, Option<String>>(key).await }
        })
        .await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let prefixed_key = self.prefix_key(key);
        let ttl_secs = ttl.as_secs().max(1);

        self.execute(|mut conn| {
            let key = prefixed_key.clone();
            let value = value.to_string();
            async move { conn.set_ex::<_, _, ()>(key, value, ttl_secs).await }
        })
        .await
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, CacheError> {
        let prefixed_key = self.prefix_key(key);

        let ttl_secs: i64 = self
            .execute(|mut conn| {
                let key = prefixed_key.clone();
                async move { conn.ttl(key).await }
            })
            .await?;

        // Redis returns -2 if key doesn't exist, -1 if no TTL
        if ttl_secs < 0 {
            Ok(None)
        } else {
            Ok(Some(Duration::from_secs(ttl_secs as u64)))
        }
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
