#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use sql_scope::prelude::*;

/// Answers every query with one row naming itself, and counts calls.
pub struct NamedClient {
    pub name: String,
    pub calls: AtomicUsize,
}

impl NamedClient {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueryClient for NamedClient {
    async fn query(&self, text: &str, values: &[RowValues]) -> Result<ResultSet, SqlScopeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        let mut rs = ResultSet::with_capacity(1);
        rs.set_column_names(Arc::new(vec![
            "client".to_string(),
            "sql".to_string(),
            "params".to_string(),
        ]));
        rs.add_row_values(vec![
            RowValues::Text(self.name.clone()),
            RowValues::Text(text.to_string()),
            RowValues::Int(values.len() as i64),
        ]);
        Ok(rs)
    }
}

/// Name of the client that answered a query run through `db`.
pub async fn whoami(db: &Db) -> Result<String, SqlScopeError> {
    let row = db
        .query("SELECT whoami")
        .first()
        .await?
        .ok_or_else(|| SqlScopeError::Other("no row".into()))?;
    row.get("client")
        .and_then(RowValues::as_text)
        .map(str::to_string)
        .ok_or_else(|| SqlScopeError::Other("no client column".into()))
}

/// A factory that hands out `NamedClient`s and counts its invocations.
pub fn counting_factory(name: &str, calls: Arc<AtomicUsize>) -> ClientFactory {
    let name = name.to_string();
    ClientFactory::shared(move || {
        calls.fetch_add(1, Ordering::SeqCst);
        let client: SharedClient = NamedClient::new(name.clone());
        async move { Ok::<_, SqlScopeError>(client) }
    })
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
