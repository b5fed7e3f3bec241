//! HTTP fetcher implementation
//!
//! This module retrieves raw catalog pages:
//! - Building the HTTP client with the configured user agent and timeouts
//! - Mapping a page index onto the catalog URL scheme
//! - Classifying transport failures
//!
//! There is no retry: any failure ends the current run.

use crate::config::SiteConfig;
use crate::{ConfigError, ScrapeError, TransportError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Source of raw page content, addressed by page index
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the textual content of catalog page `page` (1-based)
    async fn fetch_page(&self, page: u32) -> Result<String, TransportError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The remote catalog configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &SiteConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Maps a page index onto its URL
///
/// Page 1 is the catalog root itself; page N > 1 lives at `<root>/page/N`.
/// A query string on the root is kept on every page.
///
/// # Example
///
/// ```
/// use product_scraper::crawler::page_url;
/// use url::Url;
///
/// let base = Url::parse("https://shop.example.com/products").unwrap();
/// assert_eq!(page_url(&base, 1).unwrap().as_str(), "https://shop.example.com/products");
/// assert_eq!(
///     page_url(&base, 3).unwrap().as_str(),
///     "https://shop.example.com/products/page/3"
/// );
/// ```
pub fn page_url(base_url: &Url, page: u32) -> Result<Url, url::ParseError> {
    if page <= 1 {
        return Ok(base_url.clone());
    }

    let mut numbered = base_url.clone();
    numbered.set_fragment(None);
    numbered
        .path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .push("page")
        .push(&page.to_string());
    Ok(numbered)
}

/// [`PageFetcher`] backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
    base_url: Url,
}

impl HttpPageFetcher {
    /// Creates a fetcher for the configured catalog
    pub fn new(config: &SiteConfig) -> Result<Self, ScrapeError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;
        let client = build_http_client(config)?;

        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, page: u32) -> Result<String, TransportError> {
        let url = page_url(&self.base_url, page)?;
        tracing::debug!("Fetching {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_error(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| classify_error(url.as_str(), e))
    }
}

fn classify_error(url: &str, error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout {
            url: url.to_string(),
        }
    } else {
        TransportError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
