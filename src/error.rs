use std::fmt::Display;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlScopeError {
    /// A query reached the scoped proxy outside any `Db::run` scope.
    #[error(
        "no database scope is active; wrap the work in `Db::run(client_or_factory, ..)` before issuing queries"
    )]
    ContextMissing,

    /// An established scope carries neither a client nor a factory.
    #[error("scope invariant violated: {0}")]
    InvariantViolation(String),

    /// A client factory failed for a reason that is not a driver error.
    #[error("client factory failed: {0}")]
    FactoryFailure(String),

    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PoolErrorPostgres(#[from] bb8::RunError<tokio_postgres::Error>),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter conversion error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Unimplemented feature: {0}")]
    Unimplemented(String),

    #[error("Other database error: {0}")]
    Other(String),
}

impl SqlScopeError {
    /// Build a `FactoryFailure` from any displayable error.
    pub fn factory(err: impl Display) -> Self {
        SqlScopeError::FactoryFailure(err.to_string())
    }

    #[must_use]
    pub fn is_context_missing(&self) -> bool {
        matches!(self, SqlScopeError::ContextMissing)
    }
}

// The SQLite manager reports its own errors, so a user error from the pool
// is handed back as-is.
#[cfg(feature = "sqlite")]
impl From<bb8::RunError<SqlScopeError>> for SqlScopeError {
    fn from(err: bb8::RunError<SqlScopeError>) -> Self {
        match err {
            bb8::RunError::User(inner) => inner,
            bb8::RunError::TimedOut => {
                SqlScopeError::ConnectionError("SQLite pool checkout timed out".to_string())
            }
        }
    }
}
