//! The browser-control capability the pipeline consumes.
//!
//! Everything above this trait is browser-agnostic: the resolver, extractor,
//! pagination controller and session only ever talk to a [`BrowserSurface`].
//! [`crate::chrome::ChromeSurface`] is the production implementation.

use std::time::Duration;

use crate::error::ScraperError;

/// Polling interval for [`BrowserSurface::wait_until`].
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Where a query runs: the whole document or beneath one element.
#[derive(Debug)]
pub enum Scope<'a, E> {
    Document,
    Within(&'a E),
}

impl<E> Clone for Scope<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Scope<'_, E> {}

#[allow(async_fn_in_trait)]
pub trait BrowserSurface {
    type Element;

    /// All elements matching `pattern` beneath `scope`, in document order.
    async fn query_all(
        &self,
        scope: Scope<'_, Self::Element>,
        pattern: &str,
    ) -> Result<Vec<Self::Element>, ScraperError>;

    /// Rendered text of `element`; empty when it has none.
    async fn text(&self, element: &Self::Element) -> Result<String, ScraperError>;

    async fn attribute(
        &self,
        element: &Self::Element,
        name: &str,
    ) -> Result<Option<String>, ScraperError>;

    async fn click(&self, element: &Self::Element) -> Result<(), ScraperError>;

    /// Evaluates `code` in the page and returns its JSON-converted result.
    async fn run_script(&self, code: &str) -> Result<serde_json::Value, ScraperError>;

    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    /// Polls until any of `patterns` matches at document scope.
    ///
    /// Returns `Ok(false)` once `timeout` worth of pauses has elapsed without a
    /// match. A zero timeout checks exactly once. A pattern whose query fails
    /// counts as no match; the error surfaces only when every pattern failed
    /// on the last poll.
    async fn wait_until(&self, patterns: &[String], timeout: Duration) -> Result<bool, ScraperError> {
        let mut remaining = timeout;
        loop {
            let mut last_error = None;
            let mut failed = 0usize;
            for pattern in patterns {
                match self.query_all(Scope::Document, pattern).await {
                    Ok(found) if !found.is_empty() => return Ok(true),
                    Ok(_) => {}
                    Err(err) => {
                        tracing::debug!(pattern = %pattern, error = %err, "wait query failed");
                        failed += 1;
                        last_error = Some(err);
                    }
                }
            }
            if remaining.is_zero() {
                return match last_error {
                    Some(err) if failed == patterns.len() => Err(err),
                    _ => Ok(false),
                };
            }
            let step = WAIT_POLL_INTERVAL.min(remaining);
            self.pause(step).await;
            remaining -= step;
        }
    }
}
