//! Batch orchestration and the end-to-end harvest.
//!
//! [`harvest`] runs both phases:
//!
//! 1. **Discovery**: [`PaginationController`] walks the listing pages and
//!    yields deduplicated [`TitleRecord`]s
//! 2. **Expansion**: [`BatchOrchestrator`] visits each detail page, extracts a
//!    [`GameRecord`] and folds it into the [`CatalogStore`]
//!
//! and finally writes the store with [`outputs::json::write_catalog`].
//!
//! Each detail page is one unit of work yielding an [`ItemOutcome`]. A failed
//! unit is logged and contributes nothing to the store; it never stops the
//! batch. Only the final write is allowed to fail the run.

use crate::config::CrawlConfig;
use crate::error::{FetchError, HarvestError};
use crate::fetcher::{PageFetcher, load_ready};
use crate::models::{CatalogStore, GameRecord, TitleRecord};
use crate::outputs;
use crate::scrapers::detail;
use crate::scrapers::pagination::{PaginationController, TerminationReason};
use crate::utils::truncate_for_log;
use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

/// Why a single detail page contributed nothing.
#[derive(Debug)]
pub enum ItemFailure {
    Fetch(FetchError),
    NotReady(Duration),
    MissingTitle,
}

impl fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemFailure::Fetch(e) => write!(f, "fetch failed: {e}"),
            ItemFailure::NotReady(timeout) => write!(f, "page not ready within {timeout:?}"),
            ItemFailure::MissingTitle => f.write_str("page has no title"),
        }
    }
}

/// Tagged result of one detail-page unit of work.
#[derive(Debug)]
pub enum ItemOutcome {
    Success(GameRecord),
    Failure(ItemFailure),
}

/// Counts for a finished batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub discovered: usize,
    pub persisted: usize,
    /// Failed titles with the reason, in processing order.
    pub failed: Vec<(String, String)>,
}

/// Visits detail pages and owns the [`CatalogStore`] while it is built.
#[derive(Debug, Clone)]
pub struct BatchOrchestrator {
    wait_timeout: Duration,
    item_delay: Duration,
}

impl BatchOrchestrator {
    pub fn new(config: &CrawlConfig) -> Self {
        Self {
            wait_timeout: config.wait_timeout(),
            item_delay: config.item_delay(),
        }
    }

    /// Fetch and extract one detail page.
    #[instrument(level = "debug", skip_all, fields(title = %record.cleaned_title))]
    pub async fn process_item<F: PageFetcher>(&self, fetcher: &mut F, record: &TitleRecord) -> ItemOutcome {
        let html = match load_ready(fetcher, &record.detail_location, self.wait_timeout).await {
            Ok(Some(html)) => html,
            Ok(None) => return ItemOutcome::Failure(ItemFailure::NotReady(self.wait_timeout)),
            Err(e) => return ItemOutcome::Failure(ItemFailure::Fetch(e)),
        };

        let game = detail::extract(&html);
        if game.title.is_none() {
            return ItemOutcome::Failure(ItemFailure::MissingTitle);
        }
        ItemOutcome::Success(game)
    }

    /// Process every title in order, isolating per-item failures.
    #[instrument(level = "info", skip_all, fields(total = titles.len()))]
    pub async fn run<F: PageFetcher>(
        &self,
        titles: &[TitleRecord],
        fetcher: &mut F,
    ) -> (CatalogStore, BatchReport) {
        let total = titles.len();
        let mut store = CatalogStore::new();
        let mut report = BatchReport {
            discovered: total,
            ..BatchReport::default()
        };

        for (i, record) in titles.iter().enumerate() {
            match self.process_item(fetcher, record).await {
                ItemOutcome::Success(game) => {
                    store.insert(record.cleaned_title.clone(), game);
                    info!(index = i + 1, total, title = %record.cleaned_title, "Scraped info");
                    if !self.item_delay.is_zero() {
                        sleep(self.item_delay).await;
                    }
                }
                ItemOutcome::Failure(reason) => {
                    let reason = truncate_for_log(&reason.to_string(), 300);
                    error!(
                        index = i + 1,
                        total,
                        title = %record.cleaned_title,
                        url = %record.detail_location,
                        error = %reason,
                        "Failed to scrape; skipping"
                    );
                    report.failed.push((record.cleaned_title.clone(), reason));
                }
            }
        }

        report.persisted = store.len();
        info!(
            discovered = report.discovered,
            persisted = report.persisted,
            failed = report.failed.len(),
            "Completed detail pages"
        );
        (store, report)
    }
}

/// Summary of a complete harvest.
#[derive(Debug)]
pub struct HarvestSummary {
    pub pages_visited: u32,
    pub termination: TerminationReason,
    pub batch: BatchReport,
    pub store: CatalogStore,
    pub elapsed: Duration,
}

/// Crawl the listing, expand every title and persist the catalog.
///
/// # Errors
///
/// - [`HarvestError::Crawl`] if a listing page cannot be loaded
/// - [`HarvestError::Persistence`] if the final write fails; the error
///   carries the full summary so the write can be retried with
///   [`retry_persist`]
#[instrument(level = "info", skip_all, fields(output = %config.output_path.display()))]
pub async fn harvest<F: PageFetcher>(
    config: &CrawlConfig,
    fetcher: &mut F,
) -> Result<HarvestSummary, HarvestError> {
    let started = Instant::now();

    let crawl = PaginationController::new(config).crawl(fetcher).await?;
    info!(
        pages = crawl.pages_visited,
        titles = crawl.titles.len(),
        reason = %crawl.reason,
        "Discovery finished"
    );

    let (store, batch) = BatchOrchestrator::new(config).run(&crawl.titles, fetcher).await;

    let summary = HarvestSummary {
        pages_visited: crawl.pages_visited,
        termination: crawl.reason,
        batch,
        store,
        elapsed: started.elapsed(),
    };

    if let Err(source) = outputs::json::write_catalog(&summary.store, &config.output_path).await {
        error!(error = %source, "Failed to write catalog");
        return Err(HarvestError::Persistence {
            summary: Box::new(summary),
            source,
        });
    }

    info!(
        discovered = summary.batch.discovered,
        persisted = summary.batch.persisted,
        failed = summary.batch.failed.len(),
        secs = summary.elapsed.as_secs(),
        "Harvest complete"
    );

    Ok(summary)
}

/// Write the catalog carried by a [`HarvestError::Persistence`] once more.
///
/// Any other error is returned unchanged. On success the original summary is
/// handed back as if the harvest had written it itself.
pub async fn retry_persist(error: HarvestError, path: &Path) -> Result<HarvestSummary, HarvestError> {
    let (summary, source) = match error {
        HarvestError::Persistence { summary, source } => (summary, source),
        other => return Err(other),
    };

    warn!(error = %source, path = %path.display(), "Retrying catalog write once");
    match outputs::json::write_catalog(&summary.store, path).await {
        Ok(()) => {
            info!(entries = summary.store.len(), "Catalog written on retry");
            Ok(*summary)
        }
        Err(source) => Err(HarvestError::Persistence { summary, source }),
    }
}
