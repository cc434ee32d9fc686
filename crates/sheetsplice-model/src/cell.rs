use serde::{Deserialize, Serialize};

use crate::{CellRef, CellValue, Style, StyleTable, EXCEL_MAX_COLS, EXCEL_MAX_ROWS};

/// Column bits in a [`CellKey`]; `2^15` covers column `XFD`.
const COL_BITS: u32 = 15;

/// `(row << 15) | col` for a 1-based cell, so key order is reading order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct CellKey(u64);

impl CellKey {
    /// `None` when either coordinate is off the sheet.
    pub fn try_new(row: u32, col: u32) -> Option<Self> {
        let on_sheet = (1..=EXCEL_MAX_ROWS).contains(&row) && (1..=EXCEL_MAX_COLS).contains(&col);
        on_sheet.then(|| Self((u64::from(row) << COL_BITS) | u64::from(col)))
    }

    /// Panics off the sheet; worksheet accessors only see validated refs.
    #[inline]
    pub fn new(row: u32, col: u32) -> Self {
        match Self::try_new(row, col) {
            Some(key) => key,
            None => panic!("cell R{row}C{col} is off the sheet"),
        }
    }

    #[inline]
    pub const fn row(self) -> u32 {
        (self.0 >> COL_BITS) as u32
    }

    #[inline]
    pub const fn col(self) -> u32 {
        (self.0 & ((1 << COL_BITS) - 1)) as u32
    }

    #[inline]
    pub const fn to_ref(self) -> CellRef {
        CellRef::new(self.row(), self.col())
    }

    #[inline]
    pub fn from_ref(cell: CellRef) -> Self {
        Self::new(cell.row, cell.col)
    }
}

impl From<CellRef> for CellKey {
    fn from(cell: CellRef) -> Self {
        Self::from_ref(cell)
    }
}

/// Style reference carried by a cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleRef {
    /// Index into the workbook [`StyleTable`]; `0` is the default style.
    Shared(u32),
    /// Style stored on the cell itself.
    Inline(Box<Style>),
}

impl Default for StyleRef {
    fn default() -> Self {
        StyleRef::Shared(0)
    }
}

impl StyleRef {
    pub fn is_default(&self) -> bool {
        match self {
            StyleRef::Shared(id) => *id == 0,
            StyleRef::Inline(style) => style.is_default(),
        }
    }

    /// Resolve to a concrete style. Unknown shared ids resolve to the default style.
    pub fn resolve(&self, table: &StyleTable) -> Style {
        match self {
            StyleRef::Shared(id) => table.get(*id).cloned().unwrap_or_default(),
            StyleRef::Inline(style) => (**style).clone(),
        }
    }
}

/// Stored only while it has a value or a non-default style.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    #[serde(default)]
    pub value: CellValue,

    #[serde(default, skip_serializing_if = "StyleRef::is_default")]
    pub style: StyleRef,
}

impl Cell {
    pub fn new(value: CellValue) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }

    pub fn with_style(mut self, style: StyleRef) -> Self {
        self.style = style;
        self
    }

    /// Nothing to keep: no value and the default style.
    pub fn is_truly_empty(&self) -> bool {
        self.value.is_empty() && self.style.is_default()
    }
}
