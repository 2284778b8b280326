//! Dynamic scope keyed by the current async execution.
//!
//! [`establish`] makes a [`ScopeRecord`] visible to [`current`] for the whole
//! extent of a future, across every `.await` inside it. Futures polled side
//! by side (in `join_all`, `select!`, or separate tasks) each see only the
//! record established in their own chain.
//!
//! Task-local values do not follow `tokio::spawn`. Use [`spawn`] or wrap the
//! future with [`bind`] to carry the active record into a new task.

mod record;
mod store;

pub use record::ScopeRecord;
pub use store::{bind, current, establish, is_active, spawn};
