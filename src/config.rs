//! Crawl configuration.
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. built-in defaults ([`CrawlConfig::default`])
//! 2. an optional YAML file
//! 3. command-line flags (see [`crate::cli::Cli::apply_to`])
//!
//! # Example
//!
//! ```yaml
//! page_limit: 20
//! wait_timeout_secs: 8
//! item_delay_ms: 250
//! output_path: ./data/game_data.json
//! ```

use crate::error::ConfigError;
use crate::scrapers::listing::DEFAULT_CHROME_MARKERS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

pub const DEFAULT_LISTING_BASE_URL: &str = "https://www.metacritic.com/browse/game?page=";
pub const DEFAULT_DETAIL_BASE_URL: &str = "https://www.metacritic.com/game/";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrawlConfig {
    /// Upper bound on listing pages visited.
    pub page_limit: u32,
    /// Bound on mandatory readiness waits and on each HTTP request.
    pub wait_timeout_secs: u64,
    /// Bound on the optional consent and "next" control waits.
    pub interaction_timeout_secs: u64,
    /// Courtesy delay after each successfully extracted detail page.
    pub item_delay_ms: u64,
    /// Listing location; the page number is appended.
    pub listing_base_url: String,
    /// Detail location; the title slug is appended.
    pub detail_base_url: String,
    /// Where the catalog JSON is written.
    pub output_path: PathBuf,
    /// Extra attempts for a failed navigation (0 disables retrying).
    pub navigate_retries: usize,
    /// Lower-case prefixes of headings that are site chrome, not titles.
    pub chrome_markers: Vec<String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            page_limit: 568,
            wait_timeout_secs: 10,
            interaction_timeout_secs: 5,
            item_delay_ms: 100,
            listing_base_url: DEFAULT_LISTING_BASE_URL.to_string(),
            detail_base_url: DEFAULT_DETAIL_BASE_URL.to_string(),
            output_path: PathBuf::from("game_data.json"),
            navigate_retries: 0,
            chrome_markers: DEFAULT_CHROME_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl CrawlConfig {
    /// Load from a YAML file, or return defaults when `path` is `None`.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&raw).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    /// Reject settings the crawl cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_limit == 0 {
            return Err(ConfigError::Invalid("page_limit must be at least 1".into()));
        }
        if self.wait_timeout_secs == 0 || self.interaction_timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeouts must be greater than zero".into()));
        }
        for (name, value) in [
            ("listing_base_url", &self.listing_base_url),
            ("detail_base_url", &self.detail_base_url),
        ] {
            Url::parse(value)
                .map_err(|e| ConfigError::Invalid(format!("{name} `{value}` is not a URL: {e}")))?;
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("output_path must not be empty".into()));
        }
        Ok(())
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn interaction_timeout(&self) -> Duration {
        Duration::from_secs(self.interaction_timeout_secs)
    }

    pub fn item_delay(&self) -> Duration {
        Duration::from_millis(self.item_delay_ms)
    }
}
