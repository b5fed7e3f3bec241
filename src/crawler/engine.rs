//! Crawl engine - the paginated fetch/extract loop
//!
//! The engine walks catalog pages in order, starting from a cursor:
//! - Fetching one page at a time (no parallelism across pages)
//! - Extracting records item by item, skipping broken items
//! - Appending each page's records to the shared state in one step
//! - Checking the cancellation signal before a fetch, before accumulating a
//!   page, and before advancing
//! - Exporting the accumulated records once, whatever ended the run

use crate::crawler::extractor::RecordExtractor;
use crate::crawler::fetcher::PageFetcher;
use crate::output::{ExportError, ExportSummary, Exporter};
use crate::state::{
    CancellationSignal, PageCursor, ProductRecord, RunOutcome, SharedCrawlState, Termination,
};
use std::path::PathBuf;
use std::sync::Arc;

/// What a finished run produced
#[derive(Debug)]
pub struct CrawlReport {
    pub termination: Termination,

    /// Pages whose records were accumulated
    pub pages_processed: u32,

    /// Records in the state when the run ended
    pub total_records: usize,

    pub export: Result<ExportSummary, ExportError>,
}

impl CrawlReport {
    /// Condensed form stored in the crawl state for observers
    pub fn outcome(&self) -> RunOutcome {
        let (export_path, export_error) = match &self.export {
            Ok(summary) => (Some(summary.path.display().to_string()), None),
            Err(e) => (None, Some(e.to_string())),
        };

        RunOutcome {
            termination: self.termination.clone(),
            export_path,
            export_error,
        }
    }
}

/// Orchestrates fetch → extract → accumulate across catalog pages
pub struct CrawlEngine {
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn RecordExtractor>,
    exporter: Arc<dyn Exporter>,
}

impl CrawlEngine {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn RecordExtractor>,
        exporter: Arc<dyn Exporter>,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            exporter,
        }
    }

    /// Where this engine's exports land
    pub fn export_destination(&self) -> PathBuf {
        self.exporter.destination()
    }

    /// Runs the crawl loop until exhaustion, cancellation or a fetch failure
    ///
    /// `sink` must already be in the running phase; the engine only appends
    /// to it. The exporter is invoked exactly once, after the loop ends.
    pub async fn run(
        &self,
        start: PageCursor,
        cancel: &CancellationSignal,
        sink: &SharedCrawlState,
    ) -> CrawlReport {
        let mut cursor = start;
        let mut pages_processed = 0;
        tracing::info!("Starting crawl at {}", cursor);

        let termination = loop {
            if cancel.is_cancelled() {
                tracing::info!("Stop requested before {}", cursor);
                break Termination::Cancelled;
            }

            let content = match self.fetcher.fetch_page(cursor.page()).await {
                Ok(content) => content,
                Err(e) => {
                    tracing::error!("Failed to fetch {}: {}", cursor, e);
                    break Termination::Failed {
                        page: cursor.page(),
                        error: e.to_string(),
                    };
                }
            };

            let extraction = self.extractor.extract(&content);
            for failure in &extraction.failures {
                tracing::warn!("Skipping product on {}: {}", cursor, failure);
            }

            if cancel.is_cancelled() {
                tracing::info!(
                    "Stop requested; discarding {} records from {}",
                    extraction.records.len(),
                    cursor
                );
                break Termination::Cancelled;
            }

            let page_records = extraction.records.len();
            let total = sink.append_page(extraction.records);
            pages_processed += 1;
            tracing::debug!(
                "{}: {} records ({} skipped), {} total",
                cursor,
                page_records,
                extraction.failures.len(),
                total
            );

            if cancel.is_cancelled() {
                tracing::info!("Stop requested after {}", cursor);
                break Termination::Cancelled;
            }

            if !extraction.has_next {
                tracing::info!("No next page after {}, catalog exhausted", cursor);
                break Termination::Exhausted;
            }

            cursor.advance();
        };

        let records = sink.records();
        let total_records = records.len();
        let export = self.export_records(records).await;

        tracing::info!(
            "Crawl ended ({:?}): {} pages, {} records",
            termination,
            pages_processed,
            total_records
        );

        CrawlReport {
            termination,
            pages_processed,
            total_records,
            export,
        }
    }

    /// Hands `records` to the exporter on the blocking pool
    pub(crate) async fn export_records(
        &self,
        records: Vec<ProductRecord>,
    ) -> Result<ExportSummary, ExportError> {
        let exporter = Arc::clone(&self.exporter);
        let export = tokio::task::spawn_blocking(move || exporter.export(&records))
            .await
            .unwrap_or_else(|e| Err(ExportError::Task(e.to_string())));

        if let Err(e) = &export {
            tracing::error!("Export failed: {}", e);
        }
        export
    }
}
