//! Crawl state shared between the running engine and its observers
//!
//! The engine is the only writer; progress pollers, the session and the
//! exporter read through [`SharedCrawlState::snapshot`].
use crate::state::record::ProductRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Lifecycle phase of a scrape session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No run has been started yet
    #[default]
    Idle,

    /// The crawl task is walking the catalog
    Running,

    /// A stop was requested; waiting for the crawl task to finish
    Stopping,

    /// The last run is over; its records are final
    Stopped,
}

impl Phase {
    /// Returns true while a crawl task may still write to the state
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running | Self::Stopping)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
        }
    }

    /// Human-readable status line for the progress indicator
    pub fn status_message(&self) -> &'static str {
        match self {
            Self::Idle => "Ready to scrape.",
            Self::Running => "Scraping in progress...",
            Self::Stopping => "Stopping scraper...",
            Self::Stopped => "Scraping stopped.",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a crawl run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Termination {
    /// The last page had no next-page marker
    Exhausted,

    /// The cancellation signal was observed
    Cancelled,

    /// A page could not be fetched
    Failed { page: u32, error: String },
}

/// Final result of a run as seen by observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    pub termination: Termination,

    /// Where the export landed, when it succeeded
    pub export_path: Option<String>,

    /// Export failure message, when it did not
    pub export_error: Option<String>,
}

/// Live result of an in-progress or completed run
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlState {
    /// Extracted records in page-then-item order
    pub records: Vec<ProductRecord>,

    /// Always equal to `records.len()`
    pub total_count: usize,

    pub phase: Phase,

    /// Pages whose records were accumulated
    pub pages_processed: u32,

    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Set once the run reaches [`Phase::Stopped`]
    pub outcome: Option<RunOutcome>,
}

impl CrawlState {
    /// Progress label shown next to the progress bar
    pub fn progress_label(&self) -> String {
        format!("Total Scraped: {} Items", self.total_count)
    }
}

/// Synchronized handle to a [`CrawlState`]
///
/// Cloning the handle shares the same underlying state.
#[derive(Debug, Clone, Default)]
pub struct SharedCrawlState {
    inner: Arc<RwLock<CrawlState>>,
}

impl SharedCrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a point-in-time copy of the state
    ///
    /// Holds the read lock only for the duration of the copy, so a reader
    /// never sees `total_count` disagree with `records`.
    pub fn snapshot(&self) -> CrawlState {
        self.read().clone()
    }

    pub fn phase(&self) -> Phase {
        self.read().phase
    }

    /// Copy of the accumulated records
    pub fn records(&self) -> Vec<ProductRecord> {
        self.read().records.clone()
    }

    /// Empties the state and enters [`Phase::Running`]
    pub(crate) fn begin_run(&self) -> DateTime<Utc> {
        let started_at = Utc::now();
        let mut state = self.write();
        *state = CrawlState {
            phase: Phase::Running,
            started_at: Some(started_at),
            ..CrawlState::default()
        };
        started_at
    }

    /// Appends one page worth of records and bumps the counters together
    ///
    /// Returns the new total.
    pub(crate) fn append_page(&self, records: Vec<ProductRecord>) -> usize {
        let mut state = self.write();
        state.records.extend(records);
        state.total_count = state.records.len();
        state.pages_processed += 1;
        state.total_count
    }

    /// Moves `Running` to `Stopping`; returns false in any other phase
    pub(crate) fn begin_stop(&self) -> bool {
        let mut state = self.write();
        if state.phase == Phase::Running {
            state.phase = Phase::Stopping;
            true
        } else {
            false
        }
    }

    /// Records how the run ended and enters [`Phase::Stopped`]
    pub(crate) fn finish(&self, outcome: RunOutcome) {
        let mut state = self.write();
        state.phase = Phase::Stopped;
        state.finished_at = Some(Utc::now());
        state.outcome = Some(outcome);
    }

    /// Replaces the export fields of the last outcome after a re-export
    ///
    /// Has no effect before the first run has finished.
    pub(crate) fn record_export(&self, export_path: Option<String>, export_error: Option<String>) {
        let mut state = self.write();
        if let Some(outcome) = state.outcome.as_mut() {
            outcome.export_path = export_path;
            outcome.export_error = export_error;
        }
    }

    /// Enters [`Phase::Stopped`] without an outcome (worker panicked)
    pub(crate) fn mark_stopped(&self) {
        let mut state = self.write();
        if state.phase != Phase::Stopped {
            state.phase = Phase::Stopped;
            state.finished_at = Some(Utc::now());
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, CrawlState> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CrawlState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
