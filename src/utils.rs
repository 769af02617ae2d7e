// src/utils.rs
// Cross-cutting helpers shared by the store and scheduler paths.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Run `op` up to `max_attempts` times total, sleeping `delay` between
/// attempts. A bounded loop, so the attempt count and backoff are visible in
/// one place; after exhaustion the last error is returned unchanged.
pub async fn retry_operation<T, E, F, Fut>(
    mut op: F,
    max_attempts: u32,
    delay: Duration,
) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_attempts => {
                warn!("Operation failed (attempt {attempt}/{max_attempts}), retrying: {err}");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
