//! PostgreSQL pool construction.

use std::time::{Duration, Instant};

use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Executor;
use tracing::{debug, info, warn};

use annot_core::{Error, Result};

pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Connections idle this long are closed.
const IDLE_TIMEOUT: Duration = Duration::from_secs(600);
/// Connections are recycled after this long regardless of use.
const MAX_LIFETIME: Duration = Duration::from_secs(1800);

/// Knobs for [`create_pool_with_config`].
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    /// How long a caller waits for a free connection.
    pub acquire_timeout: Duration,
    /// Schema placed ahead of `public` on every connection.
    pub search_path: Option<String>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: 1,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
            search_path: None,
        }
    }
}

impl PoolConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_connections(mut self, n: u32) -> Self {
        self.max_connections = n;
        self
    }

    pub fn min_connections(mut self, n: u32) -> Self {
        self.min_connections = n;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Pin connections to `schema`. Must be a lowercase identifier; checked
    /// when the pool is built.
    pub fn search_path(mut self, schema: impl Into<String>) -> Self {
        self.search_path = Some(schema.into());
        self
    }
}

/// Lowercase letters, digits and underscores, not starting with a digit,
/// at most 63 bytes (the PostgreSQL identifier limit).
fn check_schema_name(schema: &str) -> Result<()> {
    let mut chars = schema.chars();
    let starts_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_');
    let rest_ok = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if starts_ok && rest_ok && schema.len() <= 63 {
        Ok(())
    } else {
        Err(Error::Config(format!("Invalid schema name '{}'", schema)))
    }
}

/// Pool with default settings.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    create_pool_with_config(database_url, PoolConfig::default()).await
}

pub async fn create_pool_with_config(database_url: &str, config: PoolConfig) -> Result<PgPool> {
    let started = Instant::now();

    let mut options = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(IDLE_TIMEOUT)
        .max_lifetime(MAX_LIFETIME);

    if let Some(schema) = config.search_path.as_deref() {
        check_schema_name(schema)?;
        let set_path = format!("SET search_path TO {}, public", schema);
        options = options.after_connect(move |conn, _meta| {
            let set_path = set_path.clone();
            Box::pin(async move {
                conn.execute(set_path.as_str()).await?;
                Ok(())
            })
        });
    }

    let pool = options
        .connect(database_url)
        .await
        .map_err(Error::Database)?;

    info!(
        subsystem = "db",
        component = "pool",
        op = "connect",
        max_connections = config.max_connections,
        search_path = config.search_path.as_deref().unwrap_or("public"),
        pool_size = pool.size(),
        duration_ms = started.elapsed().as_millis() as u64,
        "Connected to PostgreSQL"
    );
    Ok(pool)
}

/// Emit pool occupancy at debug; warn when every connection is checked out.
pub fn log_pool_metrics(pool: &PgPool) {
    let (size, idle) = (pool.size(), pool.num_idle());

    debug!(
        subsystem = "db",
        component = "pool",
        pool_size = size,
        pool_idle = idle,
        "Pool occupancy"
    );
    if size > 0 && idle == 0 {
        warn!(
            subsystem = "db",
            component = "pool",
            pool_size = size,
            "All pooled connections in use"
        );
    }
}
