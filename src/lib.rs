//! Product-Scraper: a cancellable paginated catalog scraper
//!
//! This crate walks a paginated product catalog page by page, extracts product
//! records from the JSON metadata embedded in each listing, accumulates them in
//! a shared state that can be observed while the crawl is running, and exports
//! the result to a spreadsheet file when the run ends or is stopped.

pub mod config;
pub mod crawler;
pub mod output;
pub mod server;
pub mod state;

use thiserror::Error;

/// Main error type for Product-Scraper operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Export error: {0}")]
    Export(#[from] output::ExportError),

    #[error("Session error: {0}")]
    Session(#[from] crawler::SessionError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Page fetch failures
///
/// Any of these ends the current run; the records gathered so far are still
/// exported.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to build page URL: {0}")]
    Url(#[from] ::url::ParseError),
}

/// Result type alias for Product-Scraper operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlEngine, ScrapeSession};
pub use state::{CancellationSignal, CrawlState, PageCursor, Phase, ProductRecord};
