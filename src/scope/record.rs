use std::fmt;
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::client::{ClientFactory, SharedClient};
use crate::error::SqlScopeError;

/// The client (or the factory for one) attached to a single scope.
///
/// The cell is written at most once: either when the record is built from a
/// concrete client, or by the first successful factory call.
pub struct ScopeRecord {
    client: OnceCell<SharedClient>,
    factory: Option<ClientFactory>,
}

impl ScopeRecord {
    /// A record holding an already constructed client.
    #[must_use]
    pub fn with_client(client: SharedClient) -> Self {
        Self {
            client: OnceCell::new_with(Some(client)),
            factory: None,
        }
    }

    /// A record that builds its client on first use.
    #[must_use]
    pub fn with_factory(factory: ClientFactory) -> Self {
        Self {
            client: OnceCell::new(),
            factory: Some(factory),
        }
    }

    #[cfg(test)]
    pub(crate) fn empty() -> Self {
        Self {
            client: OnceCell::new(),
            factory: None,
        }
    }

    /// Whether a client has been attached or materialized yet.
    #[must_use]
    pub fn has_client(&self) -> bool {
        self.client.initialized()
    }

    /// Return the scope's client, running the factory if none exists yet.
    ///
    /// Concurrent callers on an empty cell share one factory call. A failed
    /// call leaves the cell empty, so the next caller tries again.
    ///
    /// # Errors
    /// Returns the factory's error unchanged, or
    /// `SqlScopeError::InvariantViolation` when the record has neither a
    /// client nor a factory.
    pub async fn resolve(&self) -> Result<SharedClient, SqlScopeError> {
        if let Some(client) = self.client.get() {
            tracing::trace!("scoped client already present");
            return Ok(Arc::clone(client));
        }

        let Some(factory) = &self.factory else {
            return Err(SqlScopeError::InvariantViolation(
                "scope record has neither a client nor a factory".to_string(),
            ));
        };

        let client = self
            .client
            .get_or_try_init(|| async {
                tracing::debug!("materializing scoped client from factory");
                factory.produce().await
            })
            .await?;
        Ok(Arc::clone(client))
    }
}

impl fmt::Debug for ScopeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeRecord")
            .field("has_client", &self.has_client())
            .field("has_factory", &self.factory.is_some())
            .finish()
    }
}
