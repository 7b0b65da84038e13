//! Navigation retry decorator with exponential backoff.
//!
//! Wraps any [`PageFetcher`] and retries failed `navigate` calls. Waits and
//! activations pass straight through: their timeouts already bound them.
//!
//! # Backoff Strategy
//!
//! ```text
//! delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
//! ```

use super::{Activation, PageFetcher};
use crate::error::FetchError;
use rand::{Rng, rng};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, instrument, warn};

/// Retries `navigate` on the wrapped fetcher up to `max_retries` times.
pub struct RetryFetcher<F> {
    inner: F,
    max_retries: usize,
    base_delay: Duration,
    max_delay: Duration,
}

impl<F> RetryFetcher<F>
where
    F: PageFetcher,
{
    /// Wrap `inner`. With `max_retries == 0` this is a plain pass-through.
    pub fn new(inner: F, max_retries: usize, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: Duration::from_secs(30),
        }
    }

    pub fn into_inner(self) -> F {
        self.inner
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }
}

impl<F> fmt::Debug for RetryFetcher<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetcher")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<F> PageFetcher for RetryFetcher<F>
where
    F: PageFetcher,
{
    #[instrument(level = "debug", skip(self))]
    async fn navigate(&mut self, url: &str) -> Result<String, FetchError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.inner.navigate(url).await {
                Ok(html) => return Ok(html),
                Err(e) => {
                    attempt += 1;
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        if self.max_retries > 0 {
                            error!(
                                attempt,
                                max = self.max_retries,
                                elapsed_ms_total = total_dt.as_millis() as u64,
                                error = %e,
                                "navigate() exhausted retries"
                            );
                        }
                        return Err(e);
                    }

                    let delay = self
                        .base_delay
                        .saturating_mul(1 << (attempt - 1).min(16))
                        .min(self.max_delay);
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + Duration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_total = total_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "navigate() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }

    async fn content(&mut self) -> Result<String, FetchError> {
        self.inner.content().await
    }

    async fn wait_until(&mut self, selector: &str, timeout: Duration) -> Result<bool, FetchError> {
        self.inner.wait_until(selector, timeout).await
    }

    async fn find_and_activate(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Activation, FetchError> {
        self.inner.find_and_activate(selector, timeout).await
    }
}
