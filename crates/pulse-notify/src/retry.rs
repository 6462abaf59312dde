//! Bounded retry for delivery attempts.

use crate::error::NotifyResult;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Run `op` up to `attempts` times with a fixed delay between tries.
///
/// Returns the first success, or the last error once attempts are
/// exhausted. `attempts` of zero behaves as one.
pub async fn retry_async<T, F, Fut>(attempts: u32, delay: Duration, mut op: F) -> NotifyResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = NotifyResult<T>>,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts => {
                warn!(attempt, %e, "Delivery attempt failed, retrying");
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
