//! Crawler module for the paginated catalog scrape
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching of numbered catalog pages
//! - Product record extraction from listing HTML
//! - The cancellable page loop
//! - Session lifecycle (start, stop/join, snapshot)
//! - Progress polling

mod engine;
mod extractor;
mod fetcher;
mod progress;
mod session;

pub use engine::{CrawlEngine, CrawlReport};
pub use extractor::{ExtractionError, PageExtraction, ProductListExtractor, RecordExtractor};
pub use fetcher::{build_http_client, page_url, HttpPageFetcher, PageFetcher};
pub use progress::{poll_progress, ProgressUpdate};
pub use session::{ScrapeSession, SessionError, Started, Stopped};
