//! Spreadsheet export
//!
//! Records are written to a single worksheet with a fixed column set:
//!
//! | Column      | Content                          |
//! |-------------|----------------------------------|
//! | Name        | product name                     |
//! | Price       | price with currency suffix       |
//! | Product URL | `[name](url)` link               |
//! | Image       | `<img src="..." width="50">`     |

use crate::output::traits::{ExportError, ExportSummary, Exporter, OutputResult};
use crate::state::ProductRecord;
use rust_xlsxwriter::{Format, FormatBorder, Workbook};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Header row of every export
pub const EXPORT_HEADERS: [&str; 4] = ["Name", "Price", "Product URL", "Image"];

/// Name of the worksheet holding the records
pub const SHEET_NAME: &str = "Sheet1";

/// Width (pixels) of embedded image references
const IMAGE_WIDTH: u32 = 50;

/// Renders a product link as a label/target pair
pub fn format_product_link(name: &str, url: &str) -> String {
    format!("[{}]({})", name, url)
}

/// Renders an image reference as an embeddable tag
pub fn format_image(image_url: &str) -> String {
    format!(r#"<img src="{}" width="{}">"#, image_url, IMAGE_WIDTH)
}

/// Cell contents of one data row, in header order
pub fn export_row(record: &ProductRecord) -> [String; 4] {
    [
        record.name.clone(),
        record.price_display.clone(),
        format_product_link(&record.name, &record.url),
        format_image(&record.image_url),
    ]
}

/// Encodes records into an xlsx workbook
///
/// Cell contents depend only on `records`; the container also carries the
/// workbook's creation time, so compare decoded cells rather than bytes.
pub fn render_xlsx(records: &[ProductRecord]) -> OutputResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold().set_border(FormatBorder::Thin);

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, title) in (0u16..).zip(EXPORT_HEADERS) {
        worksheet.write_string_with_format(0, col, title, &header)?;
    }

    for (row, record) in (1u32..).zip(records) {
        for (col, cell) in (0u16..).zip(export_row(record)) {
            worksheet.write_string(row, col, cell)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Writes xlsx exports to a fixed file inside a directory
#[derive(Debug, Clone)]
pub struct XlsxExporter {
    dir: PathBuf,
    file_name: String,
}

impl XlsxExporter {
    pub fn new(dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file_name: file_name.into(),
        }
    }
}

impl Exporter for XlsxExporter {
    fn export(&self, records: &[ProductRecord]) -> OutputResult<ExportSummary> {
        let bytes = render_xlsx(records)?;

        std::fs::create_dir_all(&self.dir).map_err(|source| ExportError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.destination();
        std::fs::write(&path, &bytes).map_err(|source| ExportError::Write {
            path: path.clone(),
            source,
        })?;

        let sha256 = hex::encode(Sha256::digest(&bytes));
        tracing::info!(
            "Exported {} records to {} (sha256: {})",
            records.len(),
            path.display(),
            sha256
        );

        Ok(ExportSummary {
            path,
            rows: records.len(),
            sha256,
        })
    }

    fn destination(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}
