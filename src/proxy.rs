use async_trait::async_trait;

use crate::client::QueryClient;
use crate::error::SqlScopeError;
use crate::results::ResultSet;
use crate::scope;
use crate::types::RowValues;

/// Stand-in client that forwards every query to the client of the scope
/// active in the calling chain.
///
/// It holds no connection of its own, so one instance can back a
/// process-wide handle shared by every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopedClient;

#[async_trait]
impl QueryClient for ScopedClient {
    async fn query(&self, text: &str, values: &[RowValues]) -> Result<ResultSet, SqlScopeError> {
        let record = scope::current().ok_or(SqlScopeError::ContextMissing)?;
        let client = record.resolve().await?;
        client.query(text, values).await
    }
}
