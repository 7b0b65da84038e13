//! Command-line interface definitions.
//!
//! Flags override values from the optional YAML config file; anything left
//! unset keeps the config (or built-in default) value.

use crate::config::CrawlConfig;
use clap::Parser;
use std::path::PathBuf;

/// Crawl the game catalog and write one structured record per title.
///
/// # Examples
///
/// ```sh
/// # Full crawl with defaults, writing ./game_data.json
/// game_catalog
///
/// # First three listing pages only, into a custom file
/// game_catalog --page-limit 3 -o /tmp/games.json
///
/// # Settings from a file, then print one record
/// game_catalog -c crawl.yaml --show "The Legend of Zelda: Ocarina of Time"
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, env = "GAME_CATALOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output path for the catalog JSON
    #[arg(short, long, env = "GAME_CATALOG_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Maximum number of listing pages to visit
    #[arg(long)]
    pub page_limit: Option<u32>,

    /// Seconds to wait for a page to load
    #[arg(long)]
    pub wait_timeout_secs: Option<u64>,

    /// Milliseconds to pause after each scraped title
    #[arg(long)]
    pub item_delay_ms: Option<u64>,

    /// Retries for a failed page load
    #[arg(long)]
    pub retries: Option<usize>,

    /// Print the stored record for this title when the run finishes
    #[arg(long)]
    pub show: Option<String>,
}

impl Cli {
    /// Overlay the flags that were given onto `config`.
    pub fn apply_to(&self, config: &mut CrawlConfig) {
        if let Some(output) = &self.output {
            config.output_path = output.clone();
        }
        if let Some(page_limit) = self.page_limit {
            config.page_limit = page_limit;
        }
        if let Some(secs) = self.wait_timeout_secs {
            config.wait_timeout_secs = secs;
        }
        if let Some(ms) = self.item_delay_ms {
            config.item_delay_ms = ms;
        }
        if let Some(retries) = self.retries {
            config.navigate_retries = retries;
        }
    }
}
