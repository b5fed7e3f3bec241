//! Configuration module for Product-Scraper
//!
//! The scraper runs on fixed constants (catalog root, export location, poll
//! interval). They can be overridden by a TOML file placed next to the
//! process; every key is optional.
//!
//! # Example
//!
//! ```no_run
//! use product_scraper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("product-scraper.toml")).unwrap();
//! println!("Exports go to: {}", config.output.export_dir);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, ExtractorConfig, OutputConfig, ServerConfig, SiteConfig, DEFAULT_BASE_URL,
    DEFAULT_EXPORT_DIR, DEFAULT_EXPORT_FILE, DEFAULT_POLL_INTERVAL_MS,
};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default, parse_config};

pub(crate) use validation::parse_selector;

/// Well-known configuration file name, looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "product-scraper.toml";
