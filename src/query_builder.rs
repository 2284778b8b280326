use std::borrow::Cow;

use crate::client::QueryClient;
use crate::error::SqlScopeError;
use crate::results::{CustomDbRow, ResultSet};
use crate::types::RowValues;

/// Fluent builder over any [`QueryClient`].
pub struct QueryBuilder<'c, 'q> {
    client: &'c dyn QueryClient,
    sql: &'q str,
    params: Cow<'q, [RowValues]>,
}

impl<'c, 'q> QueryBuilder<'c, 'q> {
    pub(crate) fn new(client: &'c dyn QueryClient, sql: &'q str) -> Self {
        Self {
            client,
            sql,
            params: Cow::Borrowed(&[]),
        }
    }

    /// Provide parameters for this statement.
    #[must_use]
    pub fn params(mut self, params: &'q [RowValues]) -> Self {
        self.params = Cow::Borrowed(params);
        self
    }

    /// Provide owned parameters for this statement.
    #[must_use]
    pub fn params_owned(mut self, params: Vec<RowValues>) -> Self {
        self.params = Cow::Owned(params);
        self
    }

    /// Run the statement and return every row.
    ///
    /// # Errors
    /// Returns the client's error unchanged.
    pub async fn select(self) -> Result<ResultSet, SqlScopeError> {
        self.client.query(self.sql, self.params.as_ref()).await
    }

    /// Run a statement that returns no rows and report how many it touched.
    ///
    /// # Errors
    /// Returns the client's error unchanged.
    pub async fn dml(self) -> Result<usize, SqlScopeError> {
        let rs = self.client.query(self.sql, self.params.as_ref()).await?;
        Ok(rs.rows_affected)
    }

    /// Run the statement and return only its first row.
    ///
    /// # Errors
    /// Returns the client's error unchanged.
    pub async fn first(self) -> Result<Option<CustomDbRow>, SqlScopeError> {
        Ok(self.select().await?.into_first())
    }
}
