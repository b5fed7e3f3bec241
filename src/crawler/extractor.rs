//! Product record extraction from catalog listing pages
//!
//! Each product container on a listing page carries a JSON object in an
//! attribute of an embedded element (name, price, canonical link). The image
//! lives on a separate `<img>` whose lazy-load attribute takes precedence
//! over `src`. Items are extracted independently: a broken item is reported
//! and skipped, never failing the page.

use crate::config::{parse_selector, ExtractorConfig};
use crate::state::{ProductRecord, MISSING_LINK, MISSING_TEXT};
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use serde_json::{Map, Value};
use thiserror::Error;

/// Failure to extract a single item; the item is skipped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("item {index}: structured-data element missing")]
    MissingPayload { index: usize },

    #[error("item {index}: payload attribute '{attribute}' missing")]
    MissingAttribute { index: usize, attribute: String },

    #[error("item {index}: malformed payload: {message}")]
    MalformedPayload { index: usize, message: String },

    #[error("item {index}: payload is not a JSON object")]
    NotAnObject { index: usize },
}

/// Everything extracted from one page
#[derive(Debug, Clone, Default)]
pub struct PageExtraction {
    /// Records in document order
    pub records: Vec<ProductRecord>,

    /// Items that were skipped, with the reason
    pub failures: Vec<ExtractionError>,

    /// True when the page carries a next-page marker
    pub has_next: bool,
}

impl PageExtraction {
    /// Number of item containers seen on the page
    pub fn items_seen(&self) -> usize {
        self.records.len() + self.failures.len()
    }
}

/// Turns page content into product records
pub trait RecordExtractor: Send + Sync {
    fn extract(&self, content: &str) -> PageExtraction;
}

/// Extractor for listing pages with embedded product JSON
#[derive(Debug, Clone)]
pub struct ProductListExtractor {
    item: Selector,
    payload: Selector,
    payload_attribute: String,
    image: Selector,
    image_attributes: Vec<String>,
    next_page: Selector,
    currency: String,
}

impl ProductListExtractor {
    /// Builds the extractor, parsing every configured selector up front
    pub fn new(config: &ExtractorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            item: parse_selector(&config.item_selector)?,
            payload: parse_selector(&config.payload_selector)?,
            payload_attribute: config.payload_attribute.clone(),
            image: parse_selector(&config.image_selector)?,
            image_attributes: config.image_attributes.clone(),
            next_page: parse_selector(&config.next_page_selector)?,
            currency: config.currency.clone(),
        })
    }

    fn extract_item(
        &self,
        index: usize,
        item: ElementRef<'_>,
    ) -> Result<ProductRecord, ExtractionError> {
        let payload = item
            .select(&self.payload)
            .next()
            .ok_or(ExtractionError::MissingPayload { index })?;

        let raw = payload.value().attr(&self.payload_attribute).ok_or_else(|| {
            ExtractionError::MissingAttribute {
                index,
                attribute: self.payload_attribute.clone(),
            }
        })?;

        let fields = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(fields)) => fields,
            Ok(_) => return Err(ExtractionError::NotAnObject { index }),
            Err(e) => {
                return Err(ExtractionError::MalformedPayload {
                    index,
                    message: e.to_string(),
                })
            }
        };

        let name = text_field(&fields, "item_name").unwrap_or_else(|| MISSING_TEXT.to_string());
        let price = text_field(&fields, "price").unwrap_or_else(|| MISSING_TEXT.to_string());
        let price_display = if self.currency.is_empty() {
            price
        } else {
            format!("{} {}", price, self.currency)
        };
        let url = text_field(&fields, "productlink").unwrap_or_else(|| MISSING_LINK.to_string());

        Ok(ProductRecord {
            name,
            price_display,
            url,
            image_url: self.image_reference(item),
        })
    }

    /// First non-empty image attribute in precedence order, or the sentinel
    fn image_reference(&self, item: ElementRef<'_>) -> String {
        item.select(&self.image)
            .next()
            .and_then(|img| {
                self.image_attributes
                    .iter()
                    .filter_map(|attribute| img.value().attr(attribute))
                    .map(str::trim)
                    .find(|value| !value.is_empty())
            })
            .map(str::to_string)
            .unwrap_or_else(|| MISSING_LINK.to_string())
    }
}

impl RecordExtractor for ProductListExtractor {
    fn extract(&self, content: &str) -> PageExtraction {
        let document = Html::parse_document(content);
        let mut extraction = PageExtraction {
            has_next: document.select(&self.next_page).next().is_some(),
            ..PageExtraction::default()
        };

        for (index, item) in document.select(&self.item).enumerate() {
            match self.extract_item(index, item) {
                Ok(record) => extraction.records.push(record),
                Err(e) => extraction.failures.push(e),
            }
        }

        extraction
    }
}

/// Reads a payload field as display text
///
/// Strings are trimmed, numbers keep their JSON rendering, and null, empty or
/// absent fields count as missing.
fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::Null => None,
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        other => Some(other.to_string()),
    }
}
