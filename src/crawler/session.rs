//! Scrape session - lifecycle control around the crawl engine
//!
//! A session owns one [`SharedCrawlState`], one [`CancellationSignal`] and at
//! most one crawl task. `start` launches the task and returns immediately;
//! `stop` raises the signal and joins the task, so no crawl is left running
//! once it returns. `export` writes the current records again between runs.
//! Start, stop and export are serialized on the task slot.

use crate::config::Config;
use crate::crawler::engine::{CrawlEngine, CrawlReport};
use crate::crawler::extractor::ProductListExtractor;
use crate::crawler::fetcher::HttpPageFetcher;
use crate::output::{exporter_from_config, ExportSummary};
use crate::state::{CancellationSignal, CrawlState, PageCursor, Phase, SharedCrawlState};
use crate::ScrapeError;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Rejected lifecycle operations
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("A scrape is already running")]
    AlreadyRunning,

    #[error("No scrape is running")]
    NotRunning,

    #[error("Crawl task ended abnormally: {0}")]
    Worker(String),
}

/// Confirmation of a launched run
#[derive(Debug, Clone, Copy)]
pub struct Started {
    pub started_at: DateTime<Utc>,
}

/// Confirmation of a stopped (and joined) run
#[derive(Debug)]
pub struct Stopped {
    pub report: CrawlReport,
}

/// Single-writer lifecycle around one [`CrawlEngine`]
pub struct ScrapeSession {
    engine: Arc<CrawlEngine>,
    state: SharedCrawlState,
    cancel: CancellationSignal,
    worker: Mutex<Option<JoinHandle<CrawlReport>>>,
}

impl ScrapeSession {
    pub fn new(engine: CrawlEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            state: SharedCrawlState::new(),
            cancel: CancellationSignal::new(),
            worker: Mutex::new(None),
        }
    }

    /// Wires the HTTP fetcher, listing extractor and xlsx exporter from config
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let fetcher = HttpPageFetcher::new(&config.site)?;
        let extractor = ProductListExtractor::new(&config.extractor)?;
        let exporter = exporter_from_config(&config.output);

        Ok(Self::new(CrawlEngine::new(
            Arc::new(fetcher),
            Arc::new(extractor),
            Arc::new(exporter),
        )))
    }

    /// Launches a new run from page 1
    ///
    /// Fails with [`SessionError::AlreadyRunning`] while a run is active; the
    /// running crawl and its state are left untouched.
    pub async fn start(&self) -> Result<Started, SessionError> {
        let mut worker = self.worker.lock().await;

        if self.state.phase() == Phase::Running {
            return Err(SessionError::AlreadyRunning);
        }

        // A run that ended on its own leaves a finished handle behind.
        if let Some(previous) = worker.take() {
            if let Err(e) = previous.await {
                tracing::warn!("Previous crawl task ended abnormally: {}", e);
            }
        }

        self.cancel.reset();
        let started_at = self.state.begin_run();

        let engine = Arc::clone(&self.engine);
        let cancel = self.cancel.clone();
        let state = self.state.clone();
        *worker = Some(tokio::spawn(async move {
            let report = engine.run(PageCursor::first(), &cancel, &state).await;
            state.finish(report.outcome());
            report
        }));

        tracing::info!("Scrape started at {}", started_at);
        Ok(Started { started_at })
    }

    /// Stops the running crawl and waits for it to finish
    ///
    /// The crawl finishes the step it is in (an in-flight fetch is not
    /// interrupted), exports, and exits before this returns.
    pub async fn stop(&self) -> Result<Stopped, SessionError> {
        let mut worker = self.worker.lock().await;

        if !self.state.begin_stop() {
            return Err(SessionError::NotRunning);
        }

        self.cancel.cancel();
        tracing::info!("Stop requested, waiting for the crawl task to finish");

        let Some(handle) = worker.take() else {
            self.state.mark_stopped();
            return Err(SessionError::NotRunning);
        };

        let joined = handle.await;
        self.state.mark_stopped();

        match joined {
            Ok(report) => {
                tracing::info!(
                    "Scrape stopped: {} records from {} pages",
                    report.total_records,
                    report.pages_processed
                );
                Ok(Stopped { report })
            }
            Err(e) => Err(SessionError::Worker(e.to_string())),
        }
    }

    /// Exports the current records again
    ///
    /// Rejected with [`SessionError::AlreadyRunning`] while a run is active.
    /// The export fields of the last run's outcome are replaced with the
    /// result, so a failed export can be retried without crawling again.
    pub async fn export(&self) -> crate::Result<ExportSummary> {
        let _worker = self.worker.lock().await;

        if self.state.phase().is_active() {
            return Err(SessionError::AlreadyRunning.into());
        }

        let export = self.engine.export_records(self.state.records()).await;
        match &export {
            Ok(summary) => self
                .state
                .record_export(Some(summary.path.display().to_string()), None),
            Err(e) => self.state.record_export(None, Some(e.to_string())),
        }

        export.map_err(ScrapeError::from)
    }

    /// Read-consistent copy of the live state
    pub fn snapshot(&self) -> CrawlState {
        self.state.snapshot()
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Shared handle for observers that outlive a borrow of the session
    pub fn state(&self) -> SharedCrawlState {
        self.state.clone()
    }

    /// Location of the most recent export
    pub fn export_path(&self) -> PathBuf {
        self.engine.export_destination()
    }
}

impl Drop for ScrapeSession {
    fn drop(&mut self) {
        // An unjoined crawl still winds down at its next checkpoint.
        self.cancel.cancel();
    }
}
