//! Convenient imports for common functionality.

pub use crate::client::{ClientFactory, QueryClient, SharedClient};
pub use crate::config::{ConnectionDescriptor, PoolOptions};
pub use crate::db::Db;
pub use crate::error::SqlScopeError;
pub use crate::pool::PooledClient;
pub use crate::proxy::ScopedClient;
pub use crate::query_builder::QueryBuilder;
pub use crate::results::{CustomDbRow, ResultSet};
pub use crate::scope::{self, ScopeRecord};
pub use crate::source::ClientSource;
pub use crate::types::{DatabaseType, RowValues};

#[cfg(feature = "postgres")]
pub use crate::postgres::PgManager;
#[cfg(feature = "sqlite")]
pub use crate::sqlite::SqliteManager;
