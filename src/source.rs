use std::future::Future;
use std::sync::Arc;

use crate::client::{ClientFactory, QueryClient, SharedClient};
use crate::config::PoolOptions;
use crate::error::SqlScopeError;
use crate::pool::PooledClient;
use crate::scope::ScopeRecord;

/// What a request hands to [`Db::run`](crate::Db::run): a connection
/// string, a ready client, or a factory that builds one on first use.
///
/// ```rust
/// # use sql_scope::prelude::*;
/// let from_text: ClientSource = "sqlite::memory:".into();
/// let from_factory = ClientSource::factory(|| async {
///     PooledClient::connect("sqlite::memory:", &PoolOptions::default())
/// });
/// # let _ = (from_text, from_factory);
/// ```
#[derive(Debug, Clone)]
pub enum ClientSource {
    /// A connection string; a new pooled client is built from it per scope.
    Descriptor(String),
    /// An already constructed client.
    Client(SharedClient),
    /// Builds the client lazily on the first query of the scope.
    Factory(ClientFactory),
}

impl ClientSource {
    /// Wrap a ready client.
    pub fn client<C: QueryClient + 'static>(client: C) -> Self {
        ClientSource::Client(Arc::new(client))
    }

    /// Wrap an async closure that builds the client on first use.
    pub fn factory<F, Fut, C>(factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<C, SqlScopeError>> + Send + 'static,
        C: QueryClient + 'static,
    {
        ClientSource::Factory(ClientFactory::new(factory))
    }

    /// Short label used in logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ClientSource::Descriptor(_) => "descriptor",
            ClientSource::Client(_) => "client",
            ClientSource::Factory(_) => "factory",
        }
    }

    /// Normalize into the record a scope holds.
    ///
    /// # Errors
    /// Fails only for descriptors: see [`PooledClient::connect`].
    pub fn into_record(self, options: &PoolOptions) -> Result<ScopeRecord, SqlScopeError> {
        match self {
            ClientSource::Descriptor(text) => {
                let pooled = PooledClient::connect(&text, options)?;
                Ok(ScopeRecord::with_client(Arc::new(pooled)))
            }
            ClientSource::Factory(factory) => Ok(ScopeRecord::with_factory(factory)),
            ClientSource::Client(client) => Ok(ScopeRecord::with_client(client)),
        }
    }
}

impl From<&str> for ClientSource {
    fn from(text: &str) -> Self {
        ClientSource::Descriptor(text.to_string())
    }
}

impl From<String> for ClientSource {
    fn from(text: String) -> Self {
        ClientSource::Descriptor(text)
    }
}

impl From<&String> for ClientSource {
    fn from(text: &String) -> Self {
        ClientSource::Descriptor(text.clone())
    }
}

impl From<SharedClient> for ClientSource {
    fn from(client: SharedClient) -> Self {
        ClientSource::Client(client)
    }
}

impl From<ClientFactory> for ClientSource {
    fn from(factory: ClientFactory) -> Self {
        ClientSource::Factory(factory)
    }
}

impl From<PooledClient> for ClientSource {
    fn from(client: PooledClient) -> Self {
        ClientSource::client(client)
    }
}
