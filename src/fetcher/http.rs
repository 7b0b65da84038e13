//! Static HTML fetcher backed by reqwest.
//!
//! Pages are fetched once and never re-rendered, so both waits are single
//! probes of the last fetched document. Activating a control does not
//! trigger any client-side behaviour: listing locations are parameterized
//! by page number, so the crawl only needs to know the control is there.

use super::{Activation, PageFetcher};
use crate::document;
use crate::error::FetchError;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) ",
    "Chrome/124.0 Safari/537.36 game_catalog/",
    env!("CARGO_PKG_VERSION")
);

/// Fetcher issuing one HTTP GET per navigation.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    current: Option<String>,
}

impl HttpFetcher {
    /// Build a fetcher whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            current: None,
        }
    }

    fn current(&self) -> Result<&str, FetchError> {
        self.current.as_deref().ok_or(FetchError::NoDocument)
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn navigate(&mut self, url: &str) -> Result<String, FetchError> {
        self.current = None;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let html = response.text().await?;
        debug!(bytes = html.len(), "Fetched page");
        self.current = Some(html.clone());
        Ok(html)
    }

    async fn content(&mut self) -> Result<String, FetchError> {
        self.current().map(str::to_string)
    }

    async fn wait_until(&mut self, selector: &str, _timeout: Duration) -> Result<bool, FetchError> {
        document::contains(self.current()?, selector)
    }

    async fn find_and_activate(
        &mut self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<Activation, FetchError> {
        if document::contains(self.current()?, selector)? {
            Ok(Activation::Activated)
        } else {
            Ok(Activation::NotFound)
        }
    }
}
