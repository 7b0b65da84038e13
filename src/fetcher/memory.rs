//! In-memory fetcher serving fixture documents.
//!
//! Besides serving pages it can script the failure modes the pipeline must
//! survive: navigation errors, pages that never become ready, controls that
//! are obscured, and controls that never become interactable.

use super::{Activation, PageFetcher};
use crate::document;
use crate::error::FetchError;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    pages: HashMap<String, String>,
    failing: HashSet<String>,
    never_ready: HashSet<String>,
    obscured: HashSet<String>,
    slow: HashSet<String>,
    current: Option<String>,
    visited: Vec<String>,
    activated: Vec<String>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` for `url`.
    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    /// Make navigation to `url` fail.
    pub fn failing(mut self, url: impl Into<String>) -> Self {
        self.failing.insert(url.into());
        self
    }

    /// Serve `url` but never report it as ready.
    pub fn never_ready(mut self, url: impl Into<String>) -> Self {
        self.never_ready.insert(url.into());
        self
    }

    /// Controls matching `selector` are present but refuse activation.
    pub fn obscured(mut self, selector: impl Into<String>) -> Self {
        self.obscured.insert(selector.into());
        self
    }

    /// Controls matching `selector` never become interactable.
    pub fn slow(mut self, selector: impl Into<String>) -> Self {
        self.slow.insert(selector.into());
        self
    }

    /// Every URL passed to `navigate`, in call order.
    pub fn visited(&self) -> &[String] {
        &self.visited
    }

    /// Every selector successfully activated, in call order.
    pub fn activated(&self) -> &[String] {
        &self.activated
    }

    fn current_html(&self) -> Result<&str, FetchError> {
        let url = self.current.as_deref().ok_or(FetchError::NoDocument)?;
        self.pages
            .get(url)
            .map(String::as_str)
            .ok_or_else(|| FetchError::NotFound {
                url: url.to_string(),
            })
    }
}

impl PageFetcher for MemoryFetcher {
    async fn navigate(&mut self, url: &str) -> Result<String, FetchError> {
        self.visited.push(url.to_string());
        self.current = None;
        if self.failing.contains(url) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: 503,
            });
        }
        let html = self.pages.get(url).cloned().ok_or_else(|| FetchError::NotFound {
            url: url.to_string(),
        })?;
        self.current = Some(url.to_string());
        Ok(html)
    }

    async fn content(&mut self) -> Result<String, FetchError> {
        self.current_html().map(str::to_string)
    }

    async fn wait_until(&mut self, selector: &str, _timeout: Duration) -> Result<bool, FetchError> {
        if self
            .current
            .as_ref()
            .is_some_and(|url| self.never_ready.contains(url))
        {
            return Ok(false);
        }
        document::contains(self.current_html()?, selector)
    }

    async fn find_and_activate(
        &mut self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<Activation, FetchError> {
        if !document::contains(self.current_html()?, selector)? {
            return Ok(Activation::NotFound);
        }
        if self.slow.contains(selector) {
            return Ok(Activation::TimedOut);
        }
        if self.obscured.contains(selector) {
            return Err(FetchError::Interaction {
                selector: selector.to_string(),
                message: "element click intercepted by overlay".to_string(),
            });
        }
        self.activated.push(selector.to_string());
        Ok(Activation::Activated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: Duration = Duration::from_millis(10);

    #[tokio::test]
    async fn test_serves_pages_and_records_visits() {
        let mut fetcher = MemoryFetcher::new().with_page("mem://a", "<body><p>A</p></body>");

        let html = fetcher.navigate("mem://a").await.unwrap();
        assert!(html.contains("<p>A</p>"));
        assert!(fetcher.wait_until("body", T).await.unwrap());
        assert_eq!(fetcher.visited(), ["mem://a"]);
    }

    #[tokio::test]
    async fn test_unknown_and_failing_urls() {
        let mut fetcher = MemoryFetcher::new()
            .with_page("mem://down", "<body></body>")
            .failing("mem://down");

        assert!(matches!(
            fetcher.navigate("mem://missing").await,
            Err(FetchError::NotFound { .. })
        ));
        assert!(matches!(
            fetcher.navigate("mem://down").await,
            Err(FetchError::Status { status: 503, .. })
        ));
        assert!(matches!(fetcher.content().await, Err(FetchError::NoDocument)));
    }

    #[tokio::test]
    async fn test_activation_outcomes() {
        let html = r#"<body><button id="ok">x</button><button id="hidden">y</button><button id="lag">z</button></body>"#;
        let mut fetcher = MemoryFetcher::new()
            .with_page("mem://p", html)
            .obscured("#hidden")
            .slow("#lag");
        fetcher.navigate("mem://p").await.unwrap();

        assert_eq!(fetcher.find_and_activate("#ok", T).await.unwrap(), Activation::Activated);
        assert_eq!(fetcher.find_and_activate("#gone", T).await.unwrap(), Activation::NotFound);
        assert_eq!(fetcher.find_and_activate("#lag", T).await.unwrap(), Activation::TimedOut);
        assert!(matches!(
            fetcher.find_and_activate("#hidden", T).await,
            Err(FetchError::Interaction { .. })
        ));
        assert_eq!(fetcher.activated(), ["#ok"]);
    }
}
