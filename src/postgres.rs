//! Postgres backend: a bb8 manager over `tokio_postgres` clients plus the
//! encode/decode glue between `RowValues` and Postgres types.

mod manager;
mod params;
mod query;

pub use manager::PgManager;
pub use params::Params;
pub(crate) use query::query;
pub use query::{build_result_set, postgres_extract_value};
