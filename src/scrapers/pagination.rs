//! Listing crawl state machine.
//!
//! ```text
//!            ┌──────────────────────────────────────────────┐
//!            ▼                                              │ next activated
//!   Fetching(n) ──first page──▶ ConsentPending ──▶ Advancing ┤
//!       │  └───────later pages──────────────────────▲       │ limit / no next
//!       │ not ready / fetch error                           ▼
//!       └──────────────▶ Err(CrawlError)        Terminated(reason)
//! ```
//!
//! Consent handling runs at most once per controller, on the first page, and
//! never fails the crawl. A "next" control that is missing, disabled, slow or
//! obscured ends the crawl gracefully; a listing page that does not load is
//! fatal.

use super::listing::TitleNormalizer;
use crate::config::CrawlConfig;
use crate::error::{CrawlError, FetchError};
use crate::fetcher::{Activation, PageFetcher, load_ready};
use crate::models::TitleRecord;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Cookie consent accept button.
pub const CONSENT_SELECTOR: &str = "#onetrust-accept-btn-handler";

/// Pagination "next" control; the `enabled` class excludes the disabled variant.
pub const NEXT_SELECTOR: &str = ".c-navigationPagination_item--next.enabled";

/// Why a crawl stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// No usable "next" control on the last page.
    EndOfCatalog,
    /// The configured page limit was reached.
    PageLimitReached,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::EndOfCatalog => f.write_str("end-of-catalog"),
            TerminationReason::PageLimitReached => f.write_str("page-limit-reached"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    Fetching(u32),
    ConsentPending,
    Advancing,
    Terminated(TerminationReason),
}

/// Result of a completed listing crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOutcome {
    /// Deduplicated titles in discovery order.
    pub titles: Vec<TitleRecord>,
    pub pages_visited: u32,
    pub reason: TerminationReason,
}

/// Drives the listing crawl from page 1 until termination.
#[derive(Debug)]
pub struct PaginationController {
    listing_base: String,
    page_limit: u32,
    wait_timeout: Duration,
    interaction_timeout: Duration,
    normalizer: TitleNormalizer,
    state: CrawlState,
    page: u32,
    consent_attempted: bool,
    current_html: Option<String>,
    titles: Vec<TitleRecord>,
    pages_visited: u32,
}

impl PaginationController {
    pub fn new(config: &CrawlConfig) -> Self {
        Self {
            listing_base: config.listing_base_url.clone(),
            page_limit: config.page_limit,
            wait_timeout: config.wait_timeout(),
            interaction_timeout: config.interaction_timeout(),
            normalizer: TitleNormalizer::new(config.detail_base_url.clone(), &config.chrome_markers),
            state: CrawlState::Fetching(1),
            page: 1,
            consent_attempted: false,
            current_html: None,
            titles: Vec::new(),
            pages_visited: 0,
        }
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    /// Titles accumulated so far.
    pub fn titles(&self) -> &[TitleRecord] {
        &self.titles
    }

    pub fn listing_url(&self, page: u32) -> String {
        format!("{}{}", self.listing_base, page)
    }

    /// Run the state machine to termination.
    #[instrument(level = "info", skip_all)]
    pub async fn crawl<F: PageFetcher>(mut self, fetcher: &mut F) -> Result<CrawlOutcome, CrawlError> {
        loop {
            if let CrawlState::Terminated(reason) = self.step(fetcher).await? {
                info!(
                    pages = self.pages_visited,
                    titles = self.titles.len(),
                    %reason,
                    "Listing crawl finished"
                );
                return Ok(CrawlOutcome {
                    titles: self.titles,
                    pages_visited: self.pages_visited,
                    reason,
                });
            }
        }
    }

    /// Perform one transition and return the new state.
    pub async fn step<F: PageFetcher>(&mut self, fetcher: &mut F) -> Result<CrawlState, CrawlError> {
        self.state = match self.state {
            CrawlState::Fetching(page) => self.fetch(fetcher, page).await?,
            CrawlState::ConsentPending => self.dismiss_consent(fetcher).await,
            CrawlState::Advancing => self.advance(fetcher).await?,
            terminated @ CrawlState::Terminated(_) => terminated,
        };
        Ok(self.state)
    }

    async fn fetch<F: PageFetcher>(&mut self, fetcher: &mut F, page: u32) -> Result<CrawlState, CrawlError> {
        let url = self.listing_url(page);
        info!(page, %url, "Scraping listing page");

        let html = load_ready(fetcher, &url, self.wait_timeout)
            .await
            .map_err(|source| CrawlError::ListingFetch { page, source })?
            .ok_or(CrawlError::ListingNotReady {
                page,
                timeout: self.wait_timeout,
            })?;

        self.page = page;
        self.pages_visited += 1;
        self.current_html = Some(html);

        if self.consent_attempted {
            self.collect_titles();
            Ok(CrawlState::Advancing)
        } else {
            Ok(CrawlState::ConsentPending)
        }
    }

    async fn dismiss_consent<F: PageFetcher>(&mut self, fetcher: &mut F) -> CrawlState {
        self.consent_attempted = true;
        match fetcher
            .find_and_activate(CONSENT_SELECTOR, self.interaction_timeout)
            .await
        {
            Ok(Activation::Activated) => {
                info!("Accepted cookies");
                // The overlay is gone; read the document as it is now.
                match fetcher.content().await {
                    Ok(html) => self.current_html = Some(html),
                    Err(e) => debug!(error = %e, "Could not re-read page after consent; using initial load"),
                }
            }
            Ok(outcome) => debug!(?outcome, "No consent dialog to dismiss"),
            Err(e) => debug!(error = %e, "Consent dialog could not be dismissed; continuing"),
        }
        self.collect_titles();
        CrawlState::Advancing
    }

    async fn advance<F: PageFetcher>(&mut self, fetcher: &mut F) -> Result<CrawlState, CrawlError> {
        if self.page >= self.page_limit {
            return Ok(CrawlState::Terminated(TerminationReason::PageLimitReached));
        }

        match fetcher
            .find_and_activate(NEXT_SELECTOR, self.interaction_timeout)
            .await
        {
            Ok(Activation::Activated) => Ok(CrawlState::Fetching(self.page + 1)),
            Ok(outcome) => {
                info!(page = self.page, ?outcome, "No next page; ending scrape");
                Ok(CrawlState::Terminated(TerminationReason::EndOfCatalog))
            }
            Err(e @ FetchError::Interaction { .. }) => {
                warn!(page = self.page, error = %e, "Could not click next; ending scrape");
                Ok(CrawlState::Terminated(TerminationReason::EndOfCatalog))
            }
            Err(source) => Err(CrawlError::ListingFetch {
                page: self.page,
                source,
            }),
        }
    }

    fn collect_titles(&mut self) {
        let Some(html) = self.current_html.take() else {
            return;
        };
        let found = self.normalizer.normalize(&html);
        for record in &found {
            debug!(
                n = self.titles.len() + 1,
                title = %record.cleaned_title,
                url = %record.detail_location,
                "Discovered title"
            );
            self.titles.push(record.clone());
        }
        info!(
            page = self.page,
            count = found.len(),
            total = self.titles.len(),
            "Collected titles from listing page"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::MemoryFetcher;

    const LIST: &str = "mem://browse?page=";

    fn config(page_limit: u32) -> CrawlConfig {
        CrawlConfig {
            page_limit,
            listing_base_url: LIST.to_string(),
            detail_base_url: "mem://game/".to_string(),
            ..CrawlConfig::default()
        }
    }

    fn page(titles: &[&str], next: Option<&str>, consent: bool) -> String {
        let mut body = String::new();
        if consent {
            body.push_str(r#"<div id="onetrust-banner"><h3>Manage Cookie Preferences</h3><button id="onetrust-accept-btn-handler">Accept</button></div>"#);
        }
        for t in titles {
            body.push_str(&format!("<div class=\"c-finderProductCard\"><h3>{t}</h3></div>"));
        }
        if let Some(class) = next {
            body.push_str(&format!(
                "<nav><span class=\"c-navigationPagination_item--next {class}\">Next</span></nav>"
            ));
        }
        format!("<html><body>{body}</body></html>")
    }

    fn url(n: u32) -> String {
        format!("{LIST}{n}")
    }

    fn names(outcome: &CrawlOutcome) -> Vec<&str> {
        outcome.titles.iter().map(|t| t.cleaned_title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_stops_at_disabled_next() {
        let mut fetcher = MemoryFetcher::new()
            .with_page(url(1), page(&["1. Alpha", "2. Beta"], Some("enabled"), true))
            .with_page(url(2), page(&["3. Gamma"], Some("enabled"), false))
            .with_page(url(3), page(&["4. Delta"], Some("disabled"), false))
            .with_page(url(4), page(&["5. Never"], None, false));

        let outcome = PaginationController::new(&config(50)).crawl(&mut fetcher).await.unwrap();

        assert_eq!(outcome.reason, TerminationReason::EndOfCatalog);
        assert_eq!(outcome.pages_visited, 3);
        assert_eq!(names(&outcome), vec!["Alpha", "Beta", "Gamma", "Delta"]);
        assert_eq!(fetcher.visited(), [url(1), url(2), url(3)]);
    }

    #[tokio::test]
    async fn test_consent_is_attempted_once() {
        let mut fetcher = MemoryFetcher::new()
            .with_page(url(1), page(&["1. Alpha"], Some("enabled"), true))
            .with_page(url(2), page(&["2. Beta"], None, true));

        let outcome = PaginationController::new(&config(10)).crawl(&mut fetcher).await.unwrap();

        let consent_clicks = fetcher
            .activated()
            .iter()
            .filter(|s| s.as_str() == CONSENT_SELECTOR)
            .count();
        assert_eq!(consent_clicks, 1);
        assert_eq!(names(&outcome), vec!["Alpha", "Beta"]);
    }

    #[tokio::test]
    async fn test_missing_consent_is_not_an_error() {
        let mut fetcher = MemoryFetcher::new().with_page(url(1), page(&["1. Alpha"], None, false));

        let outcome = PaginationController::new(&config(10)).crawl(&mut fetcher).await.unwrap();
        assert_eq!(names(&outcome), vec!["Alpha"]);
        assert!(fetcher.activated().is_empty());
    }

    #[tokio::test]
    async fn test_obscured_consent_is_ignored() {
        let mut fetcher = MemoryFetcher::new()
            .with_page(url(1), page(&["1. Alpha"], None, true))
            .obscured(CONSENT_SELECTOR);

        let outcome = PaginationController::new(&config(10)).crawl(&mut fetcher).await.unwrap();
        assert_eq!(names(&outcome), vec!["Alpha"]);
    }

    #[tokio::test]
    async fn test_page_limit_bounds_the_crawl() {
        let mut fetcher = MemoryFetcher::new();
        for n in 1..=5 {
            fetcher = fetcher.with_page(url(n), page(&[format!("{n}. Game {n}").as_str()], Some("enabled"), false));
        }

        let outcome = PaginationController::new(&config(2)).crawl(&mut fetcher).await.unwrap();

        assert_eq!(outcome.reason, TerminationReason::PageLimitReached);
        assert_eq!(outcome.pages_visited, 2);
        assert_eq!(names(&outcome), vec!["Game 1", "Game 2"]);
        assert_eq!(fetcher.visited().len(), 2);
    }

    #[tokio::test]
    async fn test_obscured_or_slow_next_ends_gracefully() {
        for fetcher in [
            MemoryFetcher::new().obscured(NEXT_SELECTOR),
            MemoryFetcher::new().slow(NEXT_SELECTOR),
        ] {
            let mut fetcher = fetcher
                .with_page(url(1), page(&["1. Alpha"], Some("enabled"), false))
                .with_page(url(2), page(&["2. Beta"], None, false));

            let outcome = PaginationController::new(&config(10)).crawl(&mut fetcher).await.unwrap();
            assert_eq!(outcome.reason, TerminationReason::EndOfCatalog);
            assert_eq!(outcome.pages_visited, 1);
        }
    }

    #[tokio::test]
    async fn test_listing_not_ready_is_fatal() {
        let mut fetcher = MemoryFetcher::new()
            .with_page(url(1), page(&["1. Alpha"], Some("enabled"), false))
            .with_page(url(2), page(&["2. Beta"], None, false))
            .never_ready(url(2));

        let err = PaginationController::new(&config(10)).crawl(&mut fetcher).await.unwrap_err();
        assert!(matches!(err, CrawlError::ListingNotReady { page: 2, .. }));
    }

    #[tokio::test]
    async fn test_listing_fetch_failure_is_fatal() {
        let mut fetcher = MemoryFetcher::new().failing(url(1));

        let err = PaginationController::new(&config(10)).crawl(&mut fetcher).await.unwrap_err();
        assert!(matches!(err, CrawlError::ListingFetch { page: 1, .. }));
    }

    #[tokio::test]
    async fn test_state_transitions_are_observable() {
        let mut fetcher = MemoryFetcher::new()
            .with_page(url(1), page(&["1. Alpha"], Some("enabled"), false))
            .with_page(url(2), page(&["1. Alpha"], None, false));
        let mut controller = PaginationController::new(&config(10));

        assert_eq!(controller.state(), CrawlState::Fetching(1));
        assert_eq!(controller.step(&mut fetcher).await.unwrap(), CrawlState::ConsentPending);
        assert_eq!(controller.step(&mut fetcher).await.unwrap(), CrawlState::Advancing);
        assert_eq!(controller.step(&mut fetcher).await.unwrap(), CrawlState::Fetching(2));
        assert_eq!(controller.step(&mut fetcher).await.unwrap(), CrawlState::Advancing);
        assert_eq!(
            controller.step(&mut fetcher).await.unwrap(),
            CrawlState::Terminated(TerminationReason::EndOfCatalog)
        );
        assert_eq!(controller.titles().len(), 1);
    }
}
