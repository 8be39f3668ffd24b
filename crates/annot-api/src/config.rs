//! Server configuration from environment variables.
//!
//! | Variable             | Default                     |
//! |----------------------|-----------------------------|
//! | `DATABASE_URL`       | `postgres://localhost/annot` |
//! | `HOST`               | `0.0.0.0`                   |
//! | `PORT`               | `3000`                      |
//! | `DB_MAX_CONNECTIONS` | `10`                        |
//! | `RUN_MIGRATIONS`     | `true`                      |

use std::str::FromStr;

use annot_core::{Error, Result};

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/annot";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub run_migrations: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            db_max_connections: annot_db::pool::DEFAULT_MAX_CONNECTIONS,
            run_migrations: true,
        }
    }
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "PORT", defaults.port)?,
            db_max_connections: parse_var(
                &lookup,
                "DB_MAX_CONNECTIONS",
                defaults.db_max_connections,
            )?,
            run_migrations: match lookup("RUN_MIGRATIONS") {
                None => defaults.run_migrations,
                Some(v) => parse_bool("RUN_MIGRATIONS", &v)?,
            },
        })
    }

    /// `host:port` for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} must be a number, got '{}'", key, raw))),
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(Error::Config(format!(
            "{} must be true or false, got '{}'",
            key, raw
        ))),
    }
}
