use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{StyleTable, Worksheet};

/// Current serialization schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Maximum worksheet name length in characters (Excel-compatible).
pub const EXCEL_MAX_SHEET_NAME_LEN: usize = 31;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Errors raised when adding worksheets.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WorkbookError {
    #[error("sheet name cannot be empty")]
    EmptySheetName,
    #[error("sheet name `{0}` exceeds {EXCEL_MAX_SHEET_NAME_LEN} characters")]
    SheetNameTooLong(String),
    #[error("sheet name `{name}` contains invalid character '{ch}'")]
    InvalidSheetName { name: String, ch: char },
    #[error("sheet name `{0}` already exists")]
    DuplicateSheet(String),
}

/// Validate a worksheet name the way Excel does.
pub fn validate_sheet_name(name: &str) -> Result<(), WorkbookError> {
    if name.trim().is_empty() {
        return Err(WorkbookError::EmptySheetName);
    }
    if name.chars().count() > EXCEL_MAX_SHEET_NAME_LEN {
        return Err(WorkbookError::SheetNameTooLong(name.to_string()));
    }
    if let Some(ch) = name
        .chars()
        .find(|c| matches!(c, ':' | '\\' | '/' | '?' | '*' | '[' | ']'))
    {
        return Err(WorkbookError::InvalidSheetName {
            name: name.to_string(),
            ch,
        });
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err(WorkbookError::InvalidSheetName {
            name: name.to_string(),
            ch: '\'',
        });
    }
    Ok(())
}

/// A workbook: ordered, uniquely named worksheets and a shared style table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    #[serde(default)]
    pub sheets: Vec<Worksheet>,

    /// Workbook style table (deduplicated, id `0` is the default style).
    #[serde(default)]
    pub styles: StyleTable,
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

impl Workbook {
    pub fn new() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            sheets: Vec::new(),
            styles: StyleTable::new(),
        }
    }

    /// Append an empty worksheet, returning a handle to it.
    pub fn add_sheet(&mut self, name: impl Into<String>) -> Result<&mut Worksheet, WorkbookError> {
        self.push_sheet(Worksheet::new(name))
    }

    /// Append an existing worksheet. Names are unique case-insensitively.
    pub fn push_sheet(&mut self, sheet: Worksheet) -> Result<&mut Worksheet, WorkbookError> {
        validate_sheet_name(&sheet.name)?;
        if self.sheet(&sheet.name).is_some() {
            return Err(WorkbookError::DuplicateSheet(sheet.name));
        }
        self.sheets.push(sheet);
        let idx = self.sheets.len() - 1;
        Ok(&mut self.sheets[idx])
    }

    pub fn sheet(&self, name: &str) -> Option<&Worksheet> {
        self.sheets
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Worksheet> {
        self.sheets
            .iter_mut()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|s| s.name.as_str())
    }
}
