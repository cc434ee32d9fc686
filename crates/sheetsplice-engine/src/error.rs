use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::editing::Axis;

/// Structural errors. The document is left untouched when one is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpliceError {
    #[error("sheet not found: {0}")]
    SheetNotFound(String),
    #[error("splice index must be at least 1 (got {index})")]
    InvalidIndex { index: u32 },
    #[error("splice count must be at least 1")]
    InvalidCount,
    #[error("{axis:?} splice at {index} (count {count}) is out of bounds (limit {limit})")]
    OutOfBounds {
        axis: Axis,
        index: u32,
        count: u32,
        limit: u32,
    },
}

/// The kind of metadata a warning refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataKind {
    Merge,
    ConditionalFormatting,
    DataValidation,
    Table,
    AutoFilter,
    DefinedName,
}

impl fmt::Display for MetadataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MetadataKind::Merge => "merged region",
            MetadataKind::ConditionalFormatting => "conditional formatting",
            MetadataKind::DataValidation => "data validation",
            MetadataKind::Table => "table",
            MetadataKind::AutoFilter => "autofilter",
            MetadataKind::DefinedName => "defined name",
        };
        f.write_str(s)
    }
}

/// Why a metadata entry was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail", rename_all = "snake_case")]
pub enum WarningReason {
    /// Every rectangle was deleted, or a merge shrank to a single cell.
    Collapsed,
    /// The stored reference text could not be parsed.
    Malformed(String),
    /// Nothing of the entry remained inside the sheet extent.
    OutsideExtent,
    /// A table lost its header row.
    HeaderRowDeleted,
    /// A row move carried a table's header row away from the top of the table.
    HeaderRowMoved,
}

impl fmt::Display for WarningReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningReason::Collapsed => f.write_str("range collapsed"),
            WarningReason::Malformed(err) => write!(f, "malformed reference ({err})"),
            WarningReason::OutsideExtent => f.write_str("outside the used range"),
            WarningReason::HeaderRowDeleted => f.write_str("header row deleted"),
            WarningReason::HeaderRowMoved => f.write_str("header row moved out of the table"),
        }
    }
}

/// A metadata entry dropped while rewriting; the splice itself succeeded.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{kind} `{reference}` dropped: {reason}")]
pub struct MetadataRewriteWarning {
    pub kind: MetadataKind,
    /// The entry's reference text (or name) before it was dropped.
    pub reference: String,
    pub reason: WarningReason,
}

impl MetadataRewriteWarning {
    pub fn new(kind: MetadataKind, reference: impl Into<String>, reason: WarningReason) -> Self {
        Self {
            kind,
            reference: reference.into(),
            reason,
        }
    }
}
