use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::naming::{looks_like_a1, looks_like_r1c1};
use crate::{CellRef, Range, RangeParseError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("table name cannot be empty")]
    EmptyName,
    #[error("table name is longer than 255 characters")]
    NameTooLong,
    #[error("table name must begin with a letter or '_'")]
    InvalidStartChar,
    #[error("'{ch}' is not allowed in a table name")]
    InvalidChar { ch: char },
    #[error("table name reads as a cell reference")]
    ConflictsWithCellReference,
    #[error("table name is reserved")]
    ReservedName,
    #[error("a table with this name already exists")]
    DuplicateName,
    #[error("table range has no room for a data row")]
    InvalidRange,
}

const RESERVED_TABLE_NAMES: [&str; 4] = ["R", "C", "TRUE", "FALSE"];

/// ListObject naming rules: ASCII letter or `_` first, then letters, digits,
/// `_` and `.`; at most 255 characters; nothing that parses as a reference.
pub fn validate_table_name(name: &str) -> Result<(), TableError> {
    let name = name.trim();
    let first = name.chars().next().ok_or(TableError::EmptyName)?;
    if name.chars().count() > 255 {
        return Err(TableError::NameTooLong);
    }
    if !(first == '_' || first.is_ascii_alphabetic()) {
        return Err(TableError::InvalidStartChar);
    }
    if let Some(ch) = name
        .chars()
        .find(|&ch| !(ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.')))
    {
        return Err(TableError::InvalidChar { ch });
    }
    if RESERVED_TABLE_NAMES
        .iter()
        .any(|reserved| name.eq_ignore_ascii_case(reserved))
    {
        return Err(TableError::ReservedName);
    }
    if looks_like_a1(name) || looks_like_r1c1(name) {
        return Err(TableError::ConflictsWithCellReference);
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStyleInfo {
    pub name: String,
    #[serde(default)]
    pub show_row_stripes: bool,
    #[serde(default)]
    pub show_column_stripes: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumn {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterColumn {
    /// Offset from the first column of the filter range.
    pub col_id: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

/// Autofilter over `reference`; owned by a table or by the sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoFilter {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filter_columns: Vec<FilterColumn>,
}

impl AutoFilter {
    pub fn new(range: Range) -> Self {
        Self {
            reference: range.to_string(),
            filter_columns: Vec::new(),
        }
    }

    pub fn range(&self) -> Result<Range, RangeParseError> {
        Range::from_a1(&self.reference)
    }

    /// Columns `offset..offset + count` of the filter range were deleted.
    pub fn remove_columns(&mut self, offset: u32, count: u32) {
        let end = offset.saturating_add(count);
        self.filter_columns.retain_mut(|column| {
            if column.col_id < offset {
                true
            } else if column.col_id >= end {
                column.col_id -= count;
                true
            } else {
                false
            }
        });
    }

    /// `count` columns were inserted before `offset`.
    pub fn insert_columns(&mut self, offset: u32, count: u32) {
        self.filter_columns
            .iter_mut()
            .filter(|column| column.col_id >= offset)
            .for_each(|column| column.col_id = column.col_id.saturating_add(count));
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: u32,
    pub name: String,
    pub display_name: String,
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default = "one")]
    pub header_row_count: u32,
    #[serde(default)]
    pub totals_row_count: u32,
    pub columns: Vec<TableColumn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<TableStyleInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_filter: Option<AutoFilter>,
}

fn one() -> u32 {
    1
}

/// `n` for a canonical `Column{n}` header, matched case-insensitively.
fn generated_column_number(name: &str) -> Option<u32> {
    let digits = name
        .get(..6)
        .filter(|prefix| prefix.eq_ignore_ascii_case("column"))
        .map(|_| &name[6..])?;
    if digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

impl Table {
    /// A one-header-row table over `range` with `Column1..N` headers and a
    /// filter covering the whole range.
    pub fn new(id: u32, name: impl Into<String>, range: Range) -> Result<Self, TableError> {
        let name = name.into();
        validate_table_name(&name)?;
        if range.height() < 2 {
            return Err(TableError::InvalidRange);
        }
        Ok(Self {
            id,
            display_name: name.clone(),
            name,
            reference: range.to_string(),
            header_row_count: 1,
            totals_row_count: 0,
            columns: (1..=range.width())
                .map(|n| TableColumn {
                    id: n,
                    name: format!("Column{n}"),
                })
                .collect(),
            style: None,
            auto_filter: Some(AutoFilter::new(range)),
        })
    }

    pub fn range(&self) -> Result<Range, RangeParseError> {
        Range::from_a1(&self.reference)
    }

    /// Header rows, totals rows and one data row.
    pub fn min_height(&self) -> u32 {
        self.header_row_count
            .saturating_add(self.totals_row_count)
            .saturating_add(1)
    }

    pub fn header_range(&self) -> Option<Range> {
        let range = self.range().ok()?;
        let last = range.start.row.checked_add(self.header_row_count.checked_sub(1)?)?;
        (last <= range.end.row).then(|| Range::new(range.start, CellRef::new(last, range.end.col)))
    }

    pub fn data_range(&self) -> Option<Range> {
        let range = self.range().ok()?;
        let first = range.start.row.checked_add(self.header_row_count)?;
        let last = range.end.row.checked_sub(self.totals_row_count)?;
        (first <= last).then(|| Range::from_bounds(first, range.start.col, last, range.end.col))
    }

    /// Drop the headers at 0-based `offset..offset + count`.
    pub fn remove_columns(&mut self, offset: u32, count: u32) {
        let len = self.columns.len();
        let from = (offset as usize).min(len);
        let to = from.saturating_add(count as usize).min(len);
        self.columns.drain(from..to);
        if let Some(filter) = self.auto_filter.as_mut() {
            filter.remove_columns(offset, count);
        }
    }

    /// Insert `count` headers before 0-based `offset`, named with the lowest
    /// free `ColumnN` numbers and given fresh ids.
    pub fn insert_columns(&mut self, offset: u32, count: u32) {
        let mut taken: BTreeSet<u32> = self
            .columns
            .iter()
            .filter_map(|column| generated_column_number(&column.name))
            .collect();
        let first_id = self.columns.iter().map(|c| c.id).max().unwrap_or(0) + 1;

        let mut candidates = 1u32..;
        let fresh: Vec<TableColumn> = (first_id..first_id + count)
            .map(|id| {
                let n = candidates
                    .by_ref()
                    .find(|n| taken.insert(*n))
                    .unwrap_or(u32::MAX);
                TableColumn {
                    id,
                    name: format!("Column{n}"),
                }
            })
            .collect();

        let at = (offset as usize).min(self.columns.len());
        self.columns.splice(at..at, fresh);
        if let Some(filter) = self.auto_filter.as_mut() {
            filter.insert_columns(offset, count);
        }
    }
}
