//! Output module for persisting scrape results
//!
//! This module handles:
//! - The exporter interface invoked at the end of every run
//! - xlsx rendering of product records (links and image references included)

mod traits;
mod xlsx_export;

pub use traits::{ExportError, ExportSummary, Exporter, OutputResult};
pub use xlsx_export::{
    export_row, format_image, format_product_link, render_xlsx, XlsxExporter, EXPORT_HEADERS,
    SHEET_NAME,
};

use crate::config::OutputConfig;

/// MIME type served with the export download
pub const EXPORT_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Builds the exporter described by the output configuration
pub fn exporter_from_config(config: &OutputConfig) -> XlsxExporter {
    XlsxExporter::new(&config.export_dir, config.export_file.as_str())
}
