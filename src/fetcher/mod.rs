//! Page fetcher capability.
//!
//! The crawl never talks to the network directly. It drives a [`PageFetcher`],
//! which loads a location and exposes the rendered document plus two bounded
//! waits. Implementations:
//!
//! | Type | Module | Notes |
//! |------|--------|-------|
//! | [`HttpFetcher`] | [`http`] | Static HTML over reqwest |
//! | [`MemoryFetcher`] | [`memory`] | In-memory fixtures with scripted failures |
//! | [`RetryFetcher`] | [`retry`] | Decorator retrying `navigate` with backoff |
//!
//! Optional UI lookups report their result as an [`Activation`] instead of an
//! error so callers can match on it exhaustively. Only a control that exists
//! but refuses activation surfaces as [`FetchError::Interaction`].

pub mod http;
pub mod memory;
pub mod retry;

pub use http::HttpFetcher;
pub use memory::MemoryFetcher;
pub use retry::RetryFetcher;

use crate::error::FetchError;
use std::time::Duration;

/// Selector whose presence marks a document as ready.
pub const READY_SELECTOR: &str = "body";

/// Result of looking for a control and activating it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// The control was present, interactable, and has been activated.
    Activated,
    /// The current document has no matching control.
    NotFound,
    /// The control did not become interactable before the timeout.
    TimedOut,
}

/// A capability that loads pages and interacts with them.
///
/// All waits are bounded by the supplied timeout. Implementors keep track of
/// the "current" document, i.e. the one loaded by the last [`navigate`].
///
/// [`navigate`]: PageFetcher::navigate
#[allow(async_fn_in_trait)]
pub trait PageFetcher {
    /// Load `url` and return its rendered HTML.
    async fn navigate(&mut self, url: &str) -> Result<String, FetchError>;

    /// Re-read the rendered HTML of the current document.
    async fn content(&mut self) -> Result<String, FetchError>;

    /// Wait until an element matching `selector` exists in the current document.
    ///
    /// Returns `false` if the timeout elapsed first.
    async fn wait_until(&mut self, selector: &str, timeout: Duration) -> Result<bool, FetchError>;

    /// Find a control matching `selector` and activate it.
    async fn find_and_activate(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Activation, FetchError>;
}

/// Load `url`, wait for it to become ready and read the rendered document.
///
/// The document is read after the wait, never from the `navigate` snapshot.
/// Returns `Ok(None)` when the readiness wait timed out.
pub async fn load_ready<F: PageFetcher>(
    fetcher: &mut F,
    url: &str,
    timeout: Duration,
) -> Result<Option<String>, FetchError> {
    fetcher.navigate(url).await?;
    if fetcher.wait_until(READY_SELECTOR, timeout).await? {
        Ok(Some(fetcher.content().await?))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Serves an empty shell on navigation and fills the document in once
    /// the readiness wait has run, like a client-side rendered page.
    #[derive(Default)]
    struct DeferredRender {
        waited: bool,
    }

    impl PageFetcher for DeferredRender {
        async fn navigate(&mut self, _url: &str) -> Result<String, FetchError> {
            self.waited = false;
            Ok("<html><body></body></html>".to_string())
        }

        async fn content(&mut self) -> Result<String, FetchError> {
            if self.waited {
                Ok("<html><body><h3>1. Celeste</h3></body></html>".to_string())
            } else {
                Ok("<html><body></body></html>".to_string())
            }
        }

        async fn wait_until(&mut self, _selector: &str, _timeout: Duration) -> Result<bool, FetchError> {
            self.waited = true;
            Ok(true)
        }

        async fn find_and_activate(
            &mut self,
            _selector: &str,
            _timeout: Duration,
        ) -> Result<Activation, FetchError> {
            Ok(Activation::NotFound)
        }
    }

    #[tokio::test]
    async fn test_load_ready_reads_document_after_wait() {
        let mut fetcher = DeferredRender::default();
        let html = load_ready(&mut fetcher, "mem://browse?page=1", Duration::from_secs(1))
            .await
            .unwrap()
            .unwrap();
        assert!(html.contains("Celeste"));
    }

    #[tokio::test]
    async fn test_crawl_sees_late_rendered_titles() {
        use crate::config::CrawlConfig;
        use crate::scrapers::pagination::PaginationController;

        let config = CrawlConfig {
            listing_base_url: "mem://browse?page=".to_string(),
            detail_base_url: "mem://game/".to_string(),
            ..CrawlConfig::default()
        };
        let mut fetcher = DeferredRender::default();
        let outcome = PaginationController::new(&config).crawl(&mut fetcher).await.unwrap();

        assert_eq!(outcome.titles.len(), 1);
        assert_eq!(outcome.titles[0].cleaned_title, "Celeste");
    }
}
