//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `ProductRecord`: one extracted catalog item
//! - `CrawlState` / `SharedCrawlState`: the accumulated records, counters and phase of a run
//! - `PageCursor`: the page index the crawl is on
//! - `CancellationSignal`: the cooperative stop flag

mod cancel;
mod crawl_state;
mod cursor;
mod record;

// Re-export main types
pub use cancel::CancellationSignal;
pub use crawl_state::{CrawlState, Phase, RunOutcome, SharedCrawlState, Termination};
pub use cursor::PageCursor;
pub use record::{ProductRecord, MISSING_LINK, MISSING_TEXT};
