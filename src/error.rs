//! Error taxonomy for the harvest pipeline.
//!
//! Errors are split by where they stop the run:
//!
//! | Type | Scope | Effect |
//! |------|-------|--------|
//! | [`FetchError`] | one fetcher call | caller decides (isolated for detail pages) |
//! | [`CrawlError`] | listing crawl | fatal, the catalog target is unreachable |
//! | [`ConfigError`] | startup | fatal, nothing is fetched |
//! | [`OutputError`] | final write | fatal, see [`HarvestError::Persistence`] |
//!
//! Absent optional UI (consent dialog, "next" control) is not an error at all;
//! fetchers report it through [`crate::fetcher::Activation`].

use crate::pipeline::HarvestSummary;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single page fetcher operation.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("no page loaded for {url}")]
    NotFound { url: String },

    #[error("no document has been loaded yet")]
    NoDocument,

    #[error("invalid selector `{selector}`: {message}")]
    InvalidSelector { selector: String, message: String },

    /// The element exists but could not be activated (e.g. obscured by an overlay).
    #[error("element `{selector}` is not interactable: {message}")]
    Interaction { selector: String, message: String },
}

/// Fatal failure of the listing crawl.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("listing page {page} did not become ready within {timeout:?}")]
    ListingNotReady { page: u32, timeout: Duration },

    #[error("listing page {page} could not be fetched: {source}")]
    ListingFetch {
        page: u32,
        #[source]
        source: FetchError,
    },
}

/// Invalid or unreadable configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Failure while persisting the catalog.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("catalog JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level failure of [`crate::harvest`].
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error(transparent)]
    Crawl(#[from] CrawlError),

    /// The batch completed but the store could not be written. The summary,
    /// store included, is returned so the caller can retry the write.
    #[error("catalog with {} entries could not be persisted: {source}", .summary.store.len())]
    Persistence {
        summary: Box<HarvestSummary>,
        #[source]
        source: OutputError,
    },
}
