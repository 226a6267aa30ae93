//! Backoff retry for browser start-up.
//!
//! Launching Chrome occasionally fails on a cold machine (profile lock still
//! held, DevTools port slow to open). Those failures surface as
//! [`ScraperError::Launch`] and are retried; anything else is returned as-is.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Runs `launch` until it succeeds, fails with a non-launch error, or
/// `max_retries` retries are spent.
///
/// The wait before each retry starts at `first_delay` and doubles.
pub(crate) async fn retry_launch<T, F, Fut>(
    max_retries: u32,
    first_delay: Duration,
    mut launch: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut delay = first_delay;
    let mut retries_left = max_retries;

    loop {
        match launch().await {
            Err(ScraperError::Launch(reason)) if retries_left > 0 => {
                tracing::warn!(
                    retries_left,
                    ?delay,
                    reason = %reason,
                    "chrome launch failed, retrying"
                );
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(2);
                retries_left -= 1;
            }
            outcome => return outcome,
        }
    }
}
