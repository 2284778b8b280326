//! The one-method client interface every backend, the scoped proxy, and the
//! `Db` handle implement.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use crate::error::SqlScopeError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Issue a parameterized statement and return its result.
///
/// Statements that return no columns report their affected-row count in
/// [`ResultSet::rows_affected`].
#[async_trait]
pub trait QueryClient: Send + Sync {
    /// Run `text` with `values` bound to its placeholders.
    ///
    /// # Errors
    /// Returns whatever the underlying client reports.
    async fn query(&self, text: &str, values: &[RowValues]) -> Result<ResultSet, SqlScopeError>;
}

#[async_trait]
impl<C: QueryClient + ?Sized> QueryClient for Arc<C> {
    async fn query(&self, text: &str, values: &[RowValues]) -> Result<ResultSet, SqlScopeError> {
        (**self).query(text, values).await
    }
}

impl fmt::Debug for dyn QueryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<QueryClient>")
    }
}

/// A client shared by reference count.
pub type SharedClient = Arc<dyn QueryClient>;

type ProduceFn = dyn Fn() -> BoxFuture<'static, Result<SharedClient, SqlScopeError>> + Send + Sync;

/// Zero-argument producer of a client, invoked lazily on the first query of
/// a scope.
#[derive(Clone)]
pub struct ClientFactory {
    produce: Arc<ProduceFn>,
}

impl ClientFactory {
    /// Wrap an async closure that builds a client.
    ///
    /// ```rust
    /// # use sql_scope::prelude::*;
    /// let factory = ClientFactory::new(|| async {
    ///     PooledClient::connect("sqlite::memory:", &PoolOptions::default())
    /// });
    /// # let _ = factory;
    /// ```
    pub fn new<F, Fut, C>(factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<C, SqlScopeError>> + Send + 'static,
        C: QueryClient + 'static,
    {
        Self {
            produce: Arc::new(move || {
                factory()
                    .map(|built| built.map(|client| Arc::new(client) as SharedClient))
                    .boxed()
            }),
        }
    }

    /// Wrap an async closure that already returns a [`SharedClient`].
    pub fn shared<F, Fut>(factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<SharedClient, SqlScopeError>> + Send + 'static,
    {
        Self {
            produce: Arc::new(move || factory().boxed()),
        }
    }

    pub(crate) fn produce(&self) -> BoxFuture<'static, Result<SharedClient, SqlScopeError>> {
        (self.produce)()
    }
}

impl fmt::Debug for ClientFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientFactory").finish_non_exhaustive()
    }
}
