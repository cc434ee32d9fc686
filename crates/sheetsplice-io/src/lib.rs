//! `sheetsplice-io` reads and writes the workbook package: a zip container
//! holding `workbook.json` (schema version, sheet manifest and style table)
//! and one `sheets/sheetN.json` part per worksheet.
//!
//! Sheets that were not modified since [`parse`] are written back with their
//! original bytes.

use sheetsplice_model::WorkbookError;
use thiserror::Error;

mod package;
mod parts;

pub use package::{parse, serialize};

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("package part not found: {0}")]
    MissingPart(String),
    #[error("invalid JSON in `{part}`: {source}")]
    Json {
        part: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported schema version {found} (expected {expected})")]
    UnsupportedSchema { found: u32, expected: u32 },
    #[error("duplicate sheet name: {0}")]
    DuplicateSheet(String),
    #[error("invalid sheet: {0}")]
    Sheet(#[source] WorkbookError),
    #[error("invalid column span {min}..={max} in `{part}`")]
    InvalidColumnSpan { part: String, min: u32, max: u32 },
}
