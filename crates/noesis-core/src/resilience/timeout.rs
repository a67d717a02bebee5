//! Timeout wrapper racing an operation against a deadline (spec §4.3).

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("operation timed out after {0:?}")]
pub struct TimeoutError(pub Duration);

/// Race `op` against `deadline`. On expiry, the future is dropped (cancelling
/// it at its next `.await` point) and a [`TimeoutError`] is returned.
pub async fn timeout<Fut, T>(deadline: Duration, op: Fut) -> Result<T, TimeoutError>
where
    Fut: std::future::Future<Output = T>,
{
    tokio::time::timeout(deadline, op)
        .await
        .map_err(|_| TimeoutError(deadline))
}
