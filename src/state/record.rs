//! Product record definition
use serde::Serialize;

/// Placeholder for a missing name or price
pub const MISSING_TEXT: &str = "N/A";

/// Placeholder for a missing product link or image reference
pub const MISSING_LINK: &str = "#";

/// One scraped catalog item
///
/// Records are always structurally complete: fields the page did not provide
/// hold [`MISSING_TEXT`] or [`MISSING_LINK`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductRecord {
    /// Product name
    pub name: String,

    /// Price rendered with its currency suffix (e.g. `150 EGP`)
    pub price_display: String,

    /// Canonical product page
    pub url: String,

    /// Catalog thumbnail
    pub image_url: String,
}

impl Default for ProductRecord {
    fn default() -> Self {
        Self {
            name: MISSING_TEXT.to_string(),
            price_display: MISSING_TEXT.to_string(),
            url: MISSING_LINK.to_string(),
            image_url: MISSING_LINK.to_string(),
        }
    }
}
