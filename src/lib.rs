//! # Game Catalog
//!
//! Harvests a review site's game catalog into a single JSON file that maps
//! every title to a structured record (scores, sentiment, ESRB rating,
//! platforms, developer, publisher, genres).
//!
//! ## Architecture
//!
//! The harvest is a two-phase pipeline:
//! 1. **Discovery**: page through the catalog listing, collecting unique titles
//!    and synthesizing each title's detail-page location
//! 2. **Expansion**: visit every detail page in order, extract a record, and
//!    skip (but log) any page that fails
//! 3. **Output**: write the title → record mapping atomically as pretty JSON
//!
//! Fetching is abstracted behind [`fetcher::PageFetcher`], so the pipeline
//! runs unchanged against live HTTP or in-memory fixtures.
//!
//! ## Usage
//!
//! ```ignore
//! let config = CrawlConfig::default();
//! let mut fetcher = HttpFetcher::new(config.wait_timeout())?;
//! let summary = game_catalog::harvest(&config, &mut fetcher).await?;
//! println!("{} of {} titles stored", summary.batch.persisted, summary.batch.discovered);
//! ```

pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod outputs;
pub mod pipeline;
pub mod scrapers;
pub mod utils;

pub use config::CrawlConfig;
pub use error::HarvestError;
pub use models::{CatalogStore, GameRecord, TitleRecord};
pub use pipeline::{HarvestSummary, harvest, retry_persist};
