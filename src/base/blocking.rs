//! Filesystem work kept off the async executor.

use crate::base::neterror::NetError;

/// Run `work` on tokio's blocking pool.
///
/// The request path sends its disk work here: cache lookups and stores,
/// body decoding and cookie file access.
pub async fn run_blocking<T, F>(work: F) -> Result<T, NetError>
where
    F: FnOnce() -> Result<T, NetError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|e| {
        tracing::error!(error = %e, "blocking task failed");
        NetError::BlockingTaskFailed(e.to_string())
    })?
}
