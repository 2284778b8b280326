use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinHandle;

use super::record::ScopeRecord;

tokio::task_local! {
    static ACTIVE_SCOPE: Arc<ScopeRecord>;
}

/// Run `body` with `record` as the active scope.
///
/// The output of `body`, including any `Err`, is returned unchanged. An
/// inner `establish` shadows the outer record only while its own body runs.
pub async fn establish<F>(record: ScopeRecord, body: F) -> F::Output
where
    F: Future,
{
    ACTIVE_SCOPE.scope(Arc::new(record), body).await
}

/// The record active in the calling chain, or `None` outside any scope.
#[must_use]
pub fn current() -> Option<Arc<ScopeRecord>> {
    ACTIVE_SCOPE.try_with(Arc::clone).ok()
}

/// Whether the calling chain runs inside any scope.
#[must_use]
pub fn is_active() -> bool {
    ACTIVE_SCOPE.try_with(|_| ()).is_ok()
}

/// Capture the active record now and re-establish it whenever the returned
/// future is polled. Outside any scope the future runs unscoped.
pub fn bind<F>(future: F) -> impl Future<Output = F::Output>
where
    F: Future,
{
    let captured = current();
    async move {
        match captured {
            Some(record) => ACTIVE_SCOPE.scope(record, future).await,
            None => future.await,
        }
    }
}

/// `tokio::spawn` that carries the caller's scope into the new task.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(bind(future))
}
