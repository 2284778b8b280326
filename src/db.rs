use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::client::{QueryClient, SharedClient};
use crate::config::PoolOptions;
use crate::error::SqlScopeError;
use crate::proxy::ScopedClient;
use crate::query_builder::QueryBuilder;
use crate::results::ResultSet;
use crate::scope;
use crate::source::ClientSource;
use crate::types::RowValues;

/// The long-lived database handle application code holds.
///
/// A scoped handle routes every query to the client of the request running
/// it. Build it once and share it:
/// ```rust
/// use std::sync::LazyLock;
/// use sql_scope::prelude::*;
///
/// static DB: LazyLock<Db> = LazyLock::new(Db::scoped);
///
/// # async fn handle() -> Result<(), SqlScopeError> {
/// DB.run("sqlite::memory:", || async {
///     let rs = DB.query("SELECT 1 AS one").select().await?;
///     assert_eq!(rs.results[0].get("one"), Some(&RowValues::Int(1)));
///     Ok::<_, SqlScopeError>(())
/// })
/// .await
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Db {
    client: SharedClient,
    options: PoolOptions,
}

impl Default for Db {
    fn default() -> Self {
        Self::scoped()
    }
}

impl Db {
    /// A handle whose queries resolve against the active scope.
    #[must_use]
    pub fn scoped() -> Self {
        Self::scoped_with_options(PoolOptions::default())
    }

    /// Like [`Db::scoped`], with the pool settings used for descriptors
    /// passed to [`Db::run`].
    #[must_use]
    pub fn scoped_with_options(options: PoolOptions) -> Self {
        Self {
            client: Arc::new(ScopedClient),
            options,
        }
    }

    /// A handle bound to one fixed client. Queries go straight to it and
    /// ignore any active scope.
    pub fn from_client<C: QueryClient + 'static>(client: C) -> Self {
        Self {
            client: Arc::new(client),
            options: PoolOptions::default(),
        }
    }

    /// Options used for pools built from descriptors passed to [`Db::run`].
    #[must_use]
    pub fn pool_options(&self) -> &PoolOptions {
        &self.options
    }

    /// Start a fluent query against this handle.
    pub fn query<'a>(&'a self, sql: &'a str) -> QueryBuilder<'a, 'a> {
        QueryBuilder::new(self.client.as_ref(), sql)
    }

    /// Run `body` with `source` as the active scope.
    ///
    /// A descriptor gets a fresh pooled client owned by this scope; a factory
    /// runs on the first query and its client is reused for the rest of the
    /// scope. The scope covers every `.await` inside `body`; use
    /// [`scope::spawn`] to carry it into new tasks.
    ///
    /// # Errors
    /// Returns `body`'s error unchanged, or a `SqlScopeError` converted into
    /// `E` when `source` cannot be turned into a client.
    pub async fn run<S, F, Fut, T, E>(&self, source: S, body: F) -> Result<T, E>
    where
        S: Into<ClientSource>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<SqlScopeError>,
    {
        let source = source.into();
        tracing::debug!(source = source.kind(), "establishing database scope");
        let record = source.into_record(&self.options)?;
        scope::establish(record, async move { body().await }).await
    }
}

#[async_trait]
impl QueryClient for Db {
    async fn query(&self, text: &str, values: &[RowValues]) -> Result<ResultSet, SqlScopeError> {
        self.client.query(text, values).await
    }
}
