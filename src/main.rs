//! Command-line entry point for the catalog harvest.
//!
//! ```sh
//! RUST_LOG=game_catalog=debug game_catalog --page-limit 2 -o ./game_data.json
//! ```

use clap::Parser;
use game_catalog::cli::Cli;
use game_catalog::fetcher::{HttpFetcher, RetryFetcher};
use game_catalog::utils::ensure_writable_parent;
use game_catalog::{CrawlConfig, HarvestError, harvest, retry_persist};
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!("game_catalog starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut config = CrawlConfig::load(args.config.as_deref())?;
    args.apply_to(&mut config);
    config.validate()?;
    info!(
        page_limit = config.page_limit,
        output = %config.output_path.display(),
        "Configuration ready"
    );

    // Fail before crawling if the catalog could never be written
    if let Err(e) = ensure_writable_parent(&config.output_path).await {
        error!(
            path = %config.output_path.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    let http = HttpFetcher::new(config.wait_timeout())?;
    let mut fetcher = RetryFetcher::new(http, config.navigate_retries, Duration::from_secs(1));

    let summary = match harvest(&config, &mut fetcher).await {
        Ok(summary) => summary,
        // Last attempt before giving up on the in-memory catalog
        Err(e @ HarvestError::Persistence { .. }) => retry_persist(e, &config.output_path).await?,
        Err(e) => return Err(e.into()),
    };

    info!(
        pages = summary.pages_visited,
        termination = %summary.termination,
        discovered = summary.batch.discovered,
        persisted = summary.batch.persisted,
        failed = summary.batch.failed.len(),
        secs = summary.elapsed.as_secs(),
        path = %config.output_path.display(),
        "Game data saved"
    );

    if let Some(title) = args.show.as_deref() {
        match summary.store.get(title) {
            Some(record) => println!("{}", serde_json::to_string_pretty(record)?),
            None => warn!(%title, "Title not in catalog"),
        }
    }

    Ok(())
}
