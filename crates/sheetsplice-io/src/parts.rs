//! JSON shapes of the package parts.

use serde::{Deserialize, Serialize};
use sheetsplice_model::{ColumnDef, StyleTable, Worksheet, EXCEL_MAX_COLS};

use crate::FormatError;

pub(crate) const WORKBOOK_PART: &str = "workbook.json";

pub(crate) fn sheet_part_name(index: usize) -> String {
    format!("sheets/sheet{}.json", index + 1)
}

/// `workbook.json`.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WorkbookPart {
    pub schema_version: u32,
    #[serde(default)]
    pub sheets: Vec<SheetEntry>,
    #[serde(default)]
    pub styles: StyleTable,
}

/// One entry of the sheet manifest, in workbook order.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct SheetEntry {
    pub name: String,
    pub part: String,
}

/// A run of columns `min..=max` sharing one definition (`<col min max>`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct ColSpan {
    pub min: u32,
    pub max: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub style_id: u32,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "is_zero_u8")]
    pub outline_level: u8,
}

fn is_false(v: &bool) -> bool {
    !*v
}

fn is_zero_u8(v: &u8) -> bool {
    *v == 0
}

fn is_zero_u32(v: &u32) -> bool {
    *v == 0
}

impl ColSpan {
    fn new(min: u32, max: u32, def: &ColumnDef) -> Self {
        Self {
            min,
            max,
            width: def.width,
            style_id: def.style_id,
            hidden: def.hidden,
            outline_level: def.outline_level,
        }
    }

    fn def(&self) -> ColumnDef {
        ColumnDef {
            width: self.width,
            style_id: self.style_id,
            hidden: self.hidden,
            outline_level: self.outline_level,
        }
    }
}

/// `sheets/sheetN.json`: the worksheet with its dense column list folded into
/// spans.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct SheetPart {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cols: Vec<ColSpan>,
    pub sheet: Worksheet,
}

impl SheetPart {
    pub fn from_sheet(sheet: &Worksheet) -> Self {
        let cols = fold_columns(&sheet.column_defs);
        let mut body = sheet.clone();
        body.column_defs.clear();
        Self { cols, sheet: body }
    }

    /// Expand the spans back into the dense column list.
    pub fn into_sheet(self, part: &str) -> Result<Worksheet, FormatError> {
        let SheetPart { cols, mut sheet } = self;
        if cols.is_empty() {
            return Ok(sheet);
        }

        let mut defs: Vec<ColumnDef> = Vec::new();
        let mut prev_max = 0u32;
        for span in &cols {
            if span.min == 0
                || span.min > span.max
                || span.max > EXCEL_MAX_COLS
                || span.min <= prev_max
            {
                return Err(FormatError::InvalidColumnSpan {
                    part: part.to_string(),
                    min: span.min,
                    max: span.max,
                });
            }
            prev_max = span.max;
            defs.resize(span.min as usize - 1, ColumnDef::default());
            let def = span.def();
            defs.extend(std::iter::repeat(def).take((span.max - span.min + 1) as usize));
        }
        sheet.column_defs = defs;
        sheet.trim_column_defs();
        Ok(sheet)
    }
}

/// Merge adjacent identical explicit definitions; default entries are gaps.
fn fold_columns(defs: &[ColumnDef]) -> Vec<ColSpan> {
    let mut spans: Vec<ColSpan> = Vec::new();
    for (idx, def) in defs.iter().enumerate() {
        if !def.is_explicit() {
            continue;
        }
        let col = idx as u32 + 1;
        match spans.last_mut() {
            Some(last) if last.max + 1 == col && last.def() == *def => last.max = col,
            _ => spans.push(ColSpan::new(col, col, def)),
        }
    }
    spans
}
