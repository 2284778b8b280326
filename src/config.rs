use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SqlScopeError;
use crate::types::DatabaseType;

/// A parsed connection string.
///
/// Accepted forms:
/// - `postgres://…` / `postgresql://…` URLs and libpq `key=value` strings
/// - `sqlite://<path>`, `sqlite::memory:`, `:memory:`, and `file:` URIs
///
/// The Postgres text is handed to `tokio_postgres` unmodified.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    db_type: DatabaseType,
    target: String,
}

impl ConnectionDescriptor {
    #[must_use]
    pub fn database_type(&self) -> DatabaseType {
        self.db_type
    }

    /// The Postgres connection string, or the SQLite path/URI.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The descriptor with any password replaced by `***`, for logging.
    #[must_use]
    pub fn redacted(&self) -> String {
        match self.db_type {
            DatabaseType::Postgres => redact_postgres(&self.target),
            DatabaseType::Sqlite => self.target.clone(),
        }
    }
}

impl FromStr for ConnectionDescriptor {
    type Err = SqlScopeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(SqlScopeError::ConfigError(
                "connection descriptor is empty".to_string(),
            ));
        }

        if text.starts_with("postgres://") || text.starts_with("postgresql://") {
            return Ok(Self {
                db_type: DatabaseType::Postgres,
                target: text.to_string(),
            });
        }

        if text == "sqlite::memory:" || text == ":memory:" {
            return Ok(Self {
                db_type: DatabaseType::Sqlite,
                target: ":memory:".to_string(),
            });
        }
        if let Some(path) = text.strip_prefix("sqlite://") {
            if path.is_empty() {
                return Err(SqlScopeError::ConfigError(
                    "sqlite descriptor is missing a database path".to_string(),
                ));
            }
            return Ok(Self {
                db_type: DatabaseType::Sqlite,
                target: path.to_string(),
            });
        }
        if text.starts_with("file:") {
            return Ok(Self {
                db_type: DatabaseType::Sqlite,
                target: text.to_string(),
            });
        }

        if !text.contains("://") && text.contains('=') {
            return Ok(Self {
                db_type: DatabaseType::Postgres,
                target: text.to_string(),
            });
        }

        Err(SqlScopeError::ConfigError(format!(
            "unsupported connection descriptor: {}",
            redact_postgres(text)
        )))
    }
}

impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("db_type", &self.db_type)
            .field("target", &self.redacted())
            .finish()
    }
}

impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

fn redact_postgres(text: &str) -> String {
    if let Some((scheme, rest)) = text.split_once("://") {
        let authority_end = rest.find(['/', '?']).unwrap_or(rest.len());
        let (authority, tail) = rest.split_at(authority_end);
        return match authority.rsplit_once('@') {
            Some((userinfo, host)) => match userinfo.split_once(':') {
                Some((user, _)) => format!("{scheme}://{user}:***@{host}{tail}"),
                None => text.to_string(),
            },
            None => text.to_string(),
        };
    }

    text.split_whitespace()
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if key == "password" => "password=***".to_string(),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pool settings applied to every client built from a descriptor.
///
/// Deserializes from partial input, filling the rest from defaults:
/// ```rust
/// # use sql_scope::prelude::*;
/// let opts: PoolOptions = serde_json::from_str(r#"{ "max_size": 2 }"#).unwrap();
/// assert_eq!(opts.max_size, 2);
/// assert_eq!(opts.connection_timeout_ms, 30_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolOptions {
    pub max_size: u32,
    pub min_idle: Option<u32>,
    pub connection_timeout_ms: u64,
    pub test_on_check_out: bool,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_size: 10,
            min_idle: None,
            connection_timeout_ms: 30_000,
            test_on_check_out: true,
        }
    }
}

impl PoolOptions {
    #[must_use]
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    #[must_use]
    pub fn with_min_idle(mut self, min_idle: Option<u32>) -> Self {
        self.min_idle = min_idle;
        self
    }

    #[must_use]
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[must_use]
    pub fn with_test_on_check_out(mut self, test_on_check_out: bool) -> Self {
        self.test_on_check_out = test_on_check_out;
        self
    }

    #[must_use]
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }

    /// # Errors
    /// Returns `SqlScopeError::ConfigError` for a zero `max_size`, a zero
    /// timeout, or a `min_idle` above `max_size`.
    pub fn validate(&self) -> Result<(), SqlScopeError> {
        if self.max_size == 0 {
            return Err(SqlScopeError::ConfigError(
                "max_size must be greater than zero".to_string(),
            ));
        }
        if self.connection_timeout_ms == 0 {
            return Err(SqlScopeError::ConfigError(
                "connection_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if let Some(min_idle) = self.min_idle.filter(|min_idle| *min_idle > self.max_size) {
            return Err(SqlScopeError::ConfigError(format!(
                "min_idle ({min_idle}) exceeds max_size ({})",
                self.max_size
            )));
        }
        Ok(())
    }

    pub(crate) fn builder<M: bb8::ManageConnection>(&self) -> bb8::Builder<M> {
        bb8::Pool::builder()
            .max_size(self.max_size)
            .min_idle(self.min_idle)
            .connection_timeout(self.connection_timeout())
            .test_on_check_out(self.test_on_check_out)
    }
}
