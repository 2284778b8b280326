//! Request-scoped database clients behind one process-wide handle.
//!
//! A [`Db`] built with [`Db::scoped`] holds no connection of its own. Each
//! request wraps its work in [`Db::run`], passing a connection string, a
//! ready client, or a factory; every query issued underneath, across any
//! number of `.await` points, is routed to that request's client.
//!
//! ```rust,no_run
//! use std::sync::LazyLock;
//! use sql_scope::prelude::*;
//!
//! static DB: LazyLock<Db> = LazyLock::new(Db::scoped);
//!
//! async fn list_users(tenant_url: String) -> Result<ResultSet, SqlScopeError> {
//!     DB.run(tenant_url, || async {
//!         DB.query("SELECT id, name FROM users WHERE active = $1")
//!             .params(&[RowValues::Bool(true)])
//!             .select()
//!             .await
//!     })
//!     .await
//! }
//! ```

#[cfg(not(any(feature = "postgres", feature = "sqlite")))]
compile_error!("enable at least one of the `postgres` or `sqlite` features");

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod pool;
pub mod prelude;
pub mod proxy;
pub mod query_builder;
pub mod results;
pub mod scope;
pub mod source;
pub mod types;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use client::{ClientFactory, QueryClient, SharedClient};
pub use config::{ConnectionDescriptor, PoolOptions};
pub use db::Db;
pub use error::SqlScopeError;
pub use pool::PooledClient;
pub use proxy::ScopedClient;
pub use results::{CustomDbRow, ResultSet};
pub use source::ClientSource;
pub use types::{DatabaseType, RowValues};
