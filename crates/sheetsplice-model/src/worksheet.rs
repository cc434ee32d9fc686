use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    Cell, CellKey, CellRef, CellValue, ConditionalFormatting, DataValidation, DefinedName,
    MergedRegions, Range, StyleRef, Table,
};

static EMPTY_VALUE: CellValue = CellValue::Empty;

fn is_false(v: &bool) -> bool {
    !*v
}

fn is_zero_u8(v: &u8) -> bool {
    *v == 0
}

fn is_zero_u32(v: &u32) -> bool {
    *v == 0
}

/// Per-column formatting (`<col>` record).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column width in Excel character units; `None` uses the sheet default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    /// Shared style id; `0` is the default style.
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub style_id: u32,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "is_zero_u8")]
    pub outline_level: u8,
}

impl ColumnDef {
    /// True if the entry carries any formatting worth keeping.
    pub fn is_explicit(&self) -> bool {
        self.width.is_some() || self.style_id != 0 || self.hidden || self.outline_level != 0
    }
}

/// Per-row formatting (`<row>` attributes).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RowDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub style_id: u32,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "is_zero_u8")]
    pub outline_level: u8,
}

impl RowDef {
    pub fn is_explicit(&self) -> bool {
        self.height.is_some() || self.style_id != 0 || self.hidden || self.outline_level != 0
    }
}

/// The package part a worksheet was read from.
///
/// Kept so an untouched sheet can be written back byte-for-byte.
#[derive(Clone, Debug)]
pub struct SourcePart {
    pub bytes: Arc<[u8]>,
    /// SHA-256 of the canonical serialization produced when the part was read.
    pub canonical_digest: [u8; 32],
}

/// A worksheet: a sparse cell grid plus range-anchored metadata.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Worksheet {
    pub name: String,

    #[serde(default, with = "cell_entries")]
    cells: BTreeMap<CellKey, Cell>,

    /// Entry `i` describes column `i + 1`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub column_defs: Vec<ColumnDef>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub row_defs: BTreeMap<u32, RowDef>,

    #[serde(default, skip_serializing_if = "MergedRegions::is_empty")]
    pub merges: MergedRegions,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditional_formatting: Vec<ConditionalFormatting>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_validations: Vec<DataValidation>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tables: Vec<Table>,

    /// Sheet-level autofilter range (A1 text).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_filter: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub defined_names: Vec<DefinedName>,

    /// Stored used range (`<dimension>`); `None` for a sheet without content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<Range>,

    #[serde(skip)]
    pub source_part: Option<SourcePart>,
}

impl PartialEq for Worksheet {
    // `source_part` is provenance, not content.
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.cells == other.cells
            && self.column_defs == other.column_defs
            && self.row_defs == other.row_defs
            && self.merges == other.merges
            && self.conditional_formatting == other.conditional_formatting
            && self.data_validations == other.data_validations
            && self.tables == other.tables
            && self.auto_filter == other.auto_filter
            && self.defined_names == other.defined_names
            && self.dimension == other.dimension
    }
}

impl Worksheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
            column_defs: Vec::new(),
            row_defs: BTreeMap::new(),
            merges: MergedRegions::new(),
            conditional_formatting: Vec::new(),
            data_validations: Vec::new(),
            tables: Vec::new(),
            auto_filter: None,
            defined_names: Vec::new(),
            dimension: None,
            source_part: None,
        }
    }

    pub fn cell(&self, cell: CellRef) -> Option<&Cell> {
        self.cells.get(&CellKey::from_ref(cell))
    }

    /// The value at `cell`, or [`CellValue::Empty`].
    pub fn value(&self, cell: CellRef) -> &CellValue {
        self.cell(cell).map(|c| &c.value).unwrap_or(&EMPTY_VALUE)
    }

    pub fn set_value(&mut self, cell: CellRef, value: impl Into<CellValue>) {
        let key = CellKey::from_ref(cell);
        let entry = self.cells.entry(key).or_default();
        entry.value = value.into();
        if entry.is_truly_empty() {
            self.cells.remove(&key);
        }
    }

    pub fn set_style(&mut self, cell: CellRef, style: StyleRef) {
        let key = CellKey::from_ref(cell);
        let entry = self.cells.entry(key).or_default();
        entry.style = style;
        if entry.is_truly_empty() {
            self.cells.remove(&key);
        }
    }

    /// Store a whole cell record; truly empty cells are removed instead.
    pub fn set_cell(&mut self, cell: CellRef, record: Cell) {
        let key = CellKey::from_ref(cell);
        if record.is_truly_empty() {
            self.cells.remove(&key);
        } else {
            self.cells.insert(key, record);
        }
    }

    pub fn remove_cell(&mut self, cell: CellRef) -> Option<Cell> {
        self.cells.remove(&CellKey::from_ref(cell))
    }

    /// Cells in row-major order.
    pub fn iter_cells(&self) -> impl Iterator<Item = (CellRef, &Cell)> + '_ {
        self.cells.iter().map(|(k, c)| (k.to_ref(), c))
    }

    pub fn iter_cells_mut(&mut self) -> impl Iterator<Item = (CellRef, &mut Cell)> + '_ {
        self.cells.iter_mut().map(|(k, c)| (k.to_ref(), c))
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Remove every cell, returning them in row-major order.
    pub fn drain_cells(&mut self) -> impl Iterator<Item = (CellRef, Cell)> {
        std::mem::take(&mut self.cells)
            .into_iter()
            .map(|(k, c)| (k.to_ref(), c))
    }

    pub fn column_def(&self, col: u32) -> Option<&ColumnDef> {
        col.checked_sub(1)
            .and_then(|i| self.column_defs.get(i as usize))
    }

    /// Mutable column record, growing the dense list with defaults as needed.
    pub fn column_def_mut(&mut self, col: u32) -> &mut ColumnDef {
        let idx = col.saturating_sub(1) as usize;
        if self.column_defs.len() <= idx {
            self.column_defs.resize_with(idx + 1, ColumnDef::default);
        }
        &mut self.column_defs[idx]
    }

    /// Drop trailing default entries so the list ends at the last explicit column.
    pub fn trim_column_defs(&mut self) {
        while self.column_defs.last().is_some_and(|c| !c.is_explicit()) {
            self.column_defs.pop();
        }
    }

    /// Greatest 1-based column with an explicit definition.
    pub fn max_explicit_column(&self) -> Option<u32> {
        self.column_defs
            .iter()
            .rposition(ColumnDef::is_explicit)
            .map(|i| i as u32 + 1)
    }

    pub fn row_def(&self, row: u32) -> Option<&RowDef> {
        self.row_defs.get(&row)
    }

    /// Store a row record; default records are removed instead.
    pub fn set_row_def(&mut self, row: u32, def: RowDef) {
        if def.is_explicit() {
            self.row_defs.insert(row, def);
        } else {
            self.row_defs.remove(&row);
        }
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn defined_name(&self, name: &str) -> Option<&DefinedName> {
        self.defined_names
            .iter()
            .find(|n| n.name.eq_ignore_ascii_case(name))
    }
}

/// Cells serialize as a row-major list of `{row, col, value, style}` entries.
mod cell_entries {
    use std::collections::BTreeMap;

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::{Cell, CellKey, CellValue, StyleRef};

    #[derive(Serialize)]
    struct EntryRef<'a> {
        row: u32,
        col: u32,
        #[serde(flatten)]
        cell: &'a Cell,
    }

    #[derive(Deserialize)]
    struct Entry {
        row: u32,
        col: u32,
        #[serde(default)]
        value: CellValue,
        #[serde(default)]
        style: StyleRef,
    }

    pub fn serialize<S: Serializer>(
        cells: &BTreeMap<CellKey, Cell>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(cells.iter().map(|(key, cell)| EntryRef {
            row: key.row(),
            col: key.col(),
            cell,
        }))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<CellKey, Cell>, D::Error> {
        let entries = Vec::<Entry>::deserialize(deserializer)?;
        let mut cells = BTreeMap::new();
        for entry in entries {
            let key = CellKey::try_new(entry.row, entry.col).ok_or_else(|| {
                D::Error::custom(format!(
                    "cell coordinate out of bounds: row {}, col {}",
                    entry.row, entry.col
                ))
            })?;
            let cell = Cell {
                value: entry.value,
                style: entry.style,
            };
            if cell.is_truly_empty() {
                continue;
            }
            if cells.insert(key, cell).is_some() {
                return Err(D::Error::custom(format!(
                    "duplicate cell entry: row {}, col {}",
                    entry.row, entry.col
                )));
            }
        }
        Ok(cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_values_are_not_stored() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_value(CellRef::new(2, 3), 5.0);
        assert_eq!(sheet.cell_count(), 1);
        sheet.set_value(CellRef::new(2, 3), CellValue::Empty);
        assert_eq!(sheet.cell_count(), 0);

        sheet.set_style(CellRef::new(4, 4), StyleRef::Shared(2));
        sheet.set_value(CellRef::new(4, 4), CellValue::Empty);
        assert_eq!(sheet.cell_count(), 1);
    }

    #[test]
    fn column_defs_grow_and_trim() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.column_def_mut(3).width = Some(12.5);
        assert_eq!(sheet.column_defs.len(), 3);
        assert_eq!(sheet.max_explicit_column(), Some(3));

        sheet.column_def_mut(6);
        sheet.trim_column_defs();
        assert_eq!(sheet.column_defs.len(), 3);
    }

    #[test]
    fn cells_serialize_as_entries() {
        let mut sheet = Worksheet::new("Data");
        sheet.set_value(CellRef::new(1, 2), "x");
        let json = serde_json::to_value(&sheet).unwrap();
        assert_eq!(
            json["cells"],
            serde_json::json!([{"row": 1, "col": 2, "value": {"type": "text", "value": "x"}}])
        );
        let back: Worksheet = serde_json::from_value(json).unwrap();
        assert_eq!(back, sheet);
    }
}
