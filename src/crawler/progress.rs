//! Periodic progress observation
//!
//! The poller is a read-only consumer of crawl snapshots. It never touches
//! engine internals; it only turns a snapshot into the progress view that a
//! status indicator displays.

use crate::state::{CrawlState, Phase, ProductRecord, SharedCrawlState};
use serde::Serialize;
use std::time::Duration;

/// Progress view derived from one snapshot
#[derive(Debug, Clone, Serialize)]
pub struct ProgressUpdate {
    pub phase: Phase,
    pub status: &'static str,
    pub total_count: usize,
    pub pages_processed: u32,
    pub label: String,
    pub records: Vec<ProductRecord>,
}

impl From<CrawlState> for ProgressUpdate {
    fn from(state: CrawlState) -> Self {
        Self {
            phase: state.phase,
            status: state.phase.status_message(),
            total_count: state.total_count,
            pages_processed: state.pages_processed,
            label: state.progress_label(),
            records: state.records,
        }
    }
}

/// Polls `state` every `interval` and logs progress while a run is active
///
/// Runs until the surrounding task is dropped or aborted.
pub async fn poll_progress(state: SharedCrawlState, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut last_logged: Option<(Phase, usize)> = None;

    loop {
        ticker.tick().await;
        let snapshot = state.snapshot();
        let current = (snapshot.phase, snapshot.total_count);

        if last_logged == Some(current) {
            continue;
        }

        if snapshot.phase.is_active() || last_logged.is_some() {
            tracing::info!(
                "{} {} ({} pages)",
                snapshot.phase.status_message(),
                snapshot.progress_label(),
                snapshot.pages_processed
            );
        }
        last_logged = Some(current);
    }
}
