use serde::Deserialize;

/// Catalog root of the products listing
pub const DEFAULT_BASE_URL: &str = "https://makerselectronics.com/products";

/// Directory the spreadsheet export is written into
pub const DEFAULT_EXPORT_DIR: &str = "data";

/// File name of the spreadsheet export
pub const DEFAULT_EXPORT_FILE: &str = "products_data.xlsx";

/// Interval at which progress observers poll the crawl state (milliseconds)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

/// Main configuration structure for Product-Scraper
///
/// Every section falls back to the built-in constants, so an empty (or absent)
/// configuration file yields a working setup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Remote catalog configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// URL of page 1; later pages live under `<base-url>/page/<n>`
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// User agent sent with every page request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: format!("product-scraper/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
        }
    }
}

/// Where product data lives inside a listing page
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Container element of a single product
    #[serde(rename = "item-selector")]
    pub item_selector: String,

    /// Element (inside the container) carrying the JSON payload
    #[serde(rename = "payload-selector")]
    pub payload_selector: String,

    /// Attribute of the payload element holding the JSON object
    #[serde(rename = "payload-attribute")]
    pub payload_attribute: String,

    /// Product image element (inside the container)
    #[serde(rename = "image-selector")]
    pub image_selector: String,

    /// Image attributes in order of precedence (lazy-load first)
    #[serde(rename = "image-attributes")]
    pub image_attributes: Vec<String>,

    /// Navigation marker present only when another page follows
    #[serde(rename = "next-page-selector")]
    pub next_page_selector: String,

    /// Suffix appended to every rendered price
    pub currency: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            item_selector: "div.product-wrapper".to_string(),
            payload_selector: "span.gtm4wp_productdata".to_string(),
            payload_attribute: "data-gtm4wp_product_data".to_string(),
            image_selector: "img.attachment-shop_catalog".to_string(),
            image_attributes: vec!["data-src".to_string(), "src".to_string()],
            next_page_selector: "a.next.page-numbers".to_string(),
            currency: "EGP".to_string(),
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the export is written into (created if absent)
    #[serde(rename = "export-dir")]
    pub export_dir: String,

    /// File name of the export inside `export-dir`
    #[serde(rename = "export-file")]
    pub export_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            export_dir: DEFAULT_EXPORT_DIR.to_string(),
            export_file: DEFAULT_EXPORT_FILE.to_string(),
        }
    }
}

/// HTTP surface configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the control and download endpoints bind to
    #[serde(rename = "bind-address")]
    pub bind_address: String,

    /// Progress polling interval (milliseconds)
    #[serde(rename = "poll-interval-ms")]
    pub poll_interval_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8050".to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}
