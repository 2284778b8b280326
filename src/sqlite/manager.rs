use std::future::Future;
use std::sync::Arc;

use bb8::{ManageConnection, Pool};
use tokio::sync::Mutex;

use crate::config::PoolOptions;
use crate::error::SqlScopeError;

/// A rusqlite connection that can be moved onto the blocking pool.
pub type SharedSqliteConnection = Arc<Mutex<rusqlite::Connection>>;

/// bb8 manager opening rusqlite connections to one path or URI.
#[derive(Debug, Clone)]
pub struct SqliteManager {
    path: String,
}

impl SqliteManager {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether every connection to this target opens a private in-memory
    /// database.
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        let path = self.path();
        path == ":memory:"
            || path.starts_with("file::memory:")
            || (path.starts_with("file:") && path.contains("mode=memory"))
    }

    /// Build a pool that opens connections on demand.
    ///
    /// In-memory targets get exactly one long-lived connection, so every
    /// query in the pool sees the same database.
    #[must_use]
    pub fn lazy_pool(self, options: &PoolOptions) -> Pool<SqliteManager> {
        let builder = options.builder();
        if self.is_in_memory() {
            tracing::debug!(path = %self.path(), "in-memory sqlite pool pinned to one connection");
            builder
                .max_size(1)
                .min_idle(None)
                .idle_timeout(None)
                .max_lifetime(None)
                .build_unchecked(self)
        } else {
            builder.build_unchecked(self)
        }
    }
}

impl ManageConnection for SqliteManager {
    type Connection = SharedSqliteConnection;
    type Error = SqlScopeError;

    #[allow(clippy::manual_async_fn)]
    fn connect(&self) -> impl Future<Output = Result<Self::Connection, Self::Error>> + Send {
        let path = self.path.clone();
        async move {
            tracing::debug!(path = %path, "sqlite connect start");
            let conn = tokio::task::spawn_blocking(move || rusqlite::Connection::open(path))
                .await
                .map_err(|e| {
                    SqlScopeError::ConnectionError(format!("sqlite open join error: {e}"))
                })??;
            Ok(Arc::new(Mutex::new(conn)))
        }
    }

    #[allow(clippy::manual_async_fn)]
    fn is_valid(
        &self,
        conn: &mut Self::Connection,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send {
        let handle = Arc::clone(conn);
        async move {
            run_blocking(handle, |conn| {
                conn.query_row("SELECT 1", [], |_| Ok(()))
                    .map_err(SqlScopeError::SqliteError)
            })
            .await
        }
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}

pub(crate) async fn run_blocking<F, R>(
    conn: SharedSqliteConnection,
    func: F,
) -> Result<R, SqlScopeError>
where
    F: FnOnce(&mut rusqlite::Connection) -> Result<R, SqlScopeError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut guard = conn.blocking_lock();
        func(&mut guard)
    })
    .await
    .map_err(|e| SqlScopeError::ExecutionError(format!("sqlite worker join error: {e}")))?
}
