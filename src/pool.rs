use async_trait::async_trait;

use crate::client::QueryClient;
use crate::config::{ConnectionDescriptor, PoolOptions};
use crate::error::SqlScopeError;
use crate::results::ResultSet;
use crate::types::{DatabaseType, RowValues};

#[cfg(feature = "postgres")]
use crate::postgres::{self, PgManager};
#[cfg(feature = "sqlite")]
use crate::sqlite::{self, SqliteManager};

/// A client backed by its own bb8 pool, built from a connection descriptor.
///
/// Pools are lazy: no connection is opened until the first query, so
/// building one per scope is cheap. Dropping the last clone closes the pool.
#[derive(Clone)]
pub enum PooledClient {
    /// `PostgreSQL` connection pool
    #[cfg(feature = "postgres")]
    Postgres(bb8::Pool<PgManager>),
    /// `SQLite` connection pool
    #[cfg(feature = "sqlite")]
    Sqlite(bb8::Pool<SqliteManager>),
}

// Manual Debug implementation because the bb8 managers carry credentials
impl std::fmt::Debug for PooledClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "postgres")]
            Self::Postgres(pool) => f.debug_tuple("Postgres").field(&pool.state()).finish(),
            #[cfg(feature = "sqlite")]
            Self::Sqlite(pool) => f.debug_tuple("Sqlite").field(&pool.state()).finish(),
            #[allow(unreachable_patterns)]
            _ => f.write_str("PooledClient"),
        }
    }
}

impl PooledClient {
    /// Parse `text` and build a lazy pool for it.
    ///
    /// # Errors
    /// Returns `SqlScopeError::ConfigError` for an unrecognized descriptor or
    /// invalid options, and `SqlScopeError::Unimplemented` when the backend
    /// is not compiled in.
    pub fn connect(text: &str, options: &PoolOptions) -> Result<Self, SqlScopeError> {
        let descriptor: ConnectionDescriptor = text.parse()?;
        Self::from_descriptor(&descriptor, options)
    }

    /// Build a lazy pool for an already parsed descriptor.
    ///
    /// # Errors
    /// See [`PooledClient::connect`].
    pub fn from_descriptor(
        descriptor: &ConnectionDescriptor,
        options: &PoolOptions,
    ) -> Result<Self, SqlScopeError> {
        options.validate()?;
        tracing::debug!(descriptor = %descriptor, "building pooled client");

        match descriptor.database_type() {
            #[cfg(feature = "postgres")]
            DatabaseType::Postgres => {
                let manager = PgManager::from_connection_string(descriptor.target())?;
                Ok(PooledClient::Postgres(manager.lazy_pool(options)))
            }
            #[cfg(feature = "sqlite")]
            DatabaseType::Sqlite => {
                let manager = SqliteManager::new(descriptor.target());
                Ok(PooledClient::Sqlite(manager.lazy_pool(options)))
            }
            #[allow(unreachable_patterns)]
            other => Err(SqlScopeError::Unimplemented(format!(
                "{other:?} support is not enabled in the current build"
            ))),
        }
    }

    #[must_use]
    pub fn database_type(&self) -> DatabaseType {
        match self {
            #[cfg(feature = "postgres")]
            PooledClient::Postgres(_) => DatabaseType::Postgres,
            #[cfg(feature = "sqlite")]
            PooledClient::Sqlite(_) => DatabaseType::Sqlite,
        }
    }

    /// Connections currently open in the pool.
    #[must_use]
    pub fn connections(&self) -> u32 {
        match self {
            #[cfg(feature = "postgres")]
            PooledClient::Postgres(pool) => pool.state().connections,
            #[cfg(feature = "sqlite")]
            PooledClient::Sqlite(pool) => pool.state().connections,
        }
    }
}

#[async_trait]
impl QueryClient for PooledClient {
    async fn query(&self, text: &str, values: &[RowValues]) -> Result<ResultSet, SqlScopeError> {
        match self {
            #[cfg(feature = "postgres")]
            PooledClient::Postgres(pool) => postgres::query(pool, text, values).await,
            #[cfg(feature = "sqlite")]
            PooledClient::Sqlite(pool) => sqlite::query(pool, text, values).await,
        }
    }
}
