//! SQLite backend: a bb8 manager over rusqlite connections. Every statement
//! runs on the blocking pool so async callers never stall on disk I/O.

mod manager;
mod params;
mod query;

pub use manager::{SharedSqliteConnection, SqliteManager};
pub use params::convert_params;
pub(crate) use query::query;
pub use query::{build_result_set, sqlite_extract_value};
