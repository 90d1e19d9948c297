mod extractor;
mod fetcher;

pub use extractor::extract_articles;
pub use fetcher::PageFetcher;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::db::Repository;
use crate::error::Result;

/// Outcome of one scrape: how many listings the page held and how many were stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScrapeReport {
    pub found: usize,
    pub saved: usize,
    pub failed: usize,
}

/// Fetches the source page, extracts its listings and stores each as a new article.
///
/// Creates run concurrently (at most `concurrency` at a time) and are all
/// awaited before returning. A failed create is logged and counted, it
/// does not abort the rest of the batch.
#[instrument(level = "info", skip_all, fields(url = %fetcher.source_url()))]
pub async fn run_scrape(
    fetcher: &PageFetcher,
    repository: &Repository,
    concurrency: usize,
) -> Result<ScrapeReport> {
    let html = fetcher.fetch_page().await?;

    // The parsed DOM is not Send, keep it off the async workers.
    let listings = tokio::task::spawn_blocking(move || extract_articles(&html)).await??;
    let found = listings.len();

    let saved = stream::iter(listings)
        .map(|listing| async move {
            match repository.create_article(listing).await {
                Ok(article) => {
                    debug!(id = article.id, title = %article.title, "Saved article");
                    true
                }
                Err(e) => {
                    warn!(error = %e, "Failed to save scraped article");
                    false
                }
            }
        })
        .buffer_unordered(concurrency.max(1))
        .filter(|saved| std::future::ready(*saved))
        .count()
        .await;

    let report = ScrapeReport {
        found,
        saved,
        failed: found - saved,
    };
    info!(
        found = report.found,
        saved = report.saved,
        failed = report.failed,
        "Scrape finished"
    );
    Ok(report)
}
