use serde::{Deserialize, Serialize};
use sheetsplice_model::CellRef;

/// The axis a splice operates on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Axis {
    Rows,
    Cols,
}

impl Axis {
    /// The coordinate of `cell` along this axis.
    pub fn of(self, cell: CellRef) -> u32 {
        match self {
            Axis::Rows => cell.row,
            Axis::Cols => cell.col,
        }
    }
}

/// A structural insert, delete or move of whole rows or columns.
///
/// Indices are 1-based. The JSON form is the IPC payload used for
/// `appliedSplices`: `{"type": "deleteCols", "col": 1, "count": 1}`.
///
/// `MoveRows` takes the `count` rows starting at `row` out and puts them
/// back so that the block starts at `to`; the rows in between close ranks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Splice {
    InsertRows { row: u32, count: u32 },
    DeleteRows { row: u32, count: u32 },
    InsertCols { col: u32, count: u32 },
    DeleteCols { col: u32, count: u32 },
    MoveRows { row: u32, count: u32, to: u32 },
}

impl Splice {
    pub fn axis(&self) -> Axis {
        match self {
            Splice::InsertRows { .. } | Splice::DeleteRows { .. } | Splice::MoveRows { .. } => {
                Axis::Rows
            }
            Splice::InsertCols { .. } | Splice::DeleteCols { .. } => Axis::Cols,
        }
    }

    pub fn index(&self) -> u32 {
        match *self {
            Splice::InsertRows { row, .. }
            | Splice::DeleteRows { row, .. }
            | Splice::MoveRows { row, .. } => row,
            Splice::InsertCols { col, .. } | Splice::DeleteCols { col, .. } => col,
        }
    }

    pub fn count(&self) -> u32 {
        match *self {
            Splice::InsertRows { count, .. }
            | Splice::DeleteRows { count, .. }
            | Splice::InsertCols { count, .. }
            | Splice::DeleteCols { count, .. }
            | Splice::MoveRows { count, .. } => count,
        }
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Splice::DeleteRows { .. } | Splice::DeleteCols { .. })
    }

    /// Destination of a move; `None` for inserts and deletes.
    pub fn move_target(&self) -> Option<u32> {
        match *self {
            Splice::MoveRows { to, .. } => Some(to),
            _ => None,
        }
    }

    /// Inclusive `(first, last)` indices removed by a delete.
    pub fn deleted_span(&self) -> Option<(u32, u32)> {
        if !self.is_delete() {
            return None;
        }
        let last = self.index().saturating_add(self.count().saturating_sub(1));
        Some((self.index(), last))
    }

    /// The splice that undoes this one's index shift (not its data loss).
    pub fn inverse(&self) -> Splice {
        match *self {
            Splice::InsertRows { row, count } => Splice::DeleteRows { row, count },
            Splice::DeleteRows { row, count } => Splice::InsertRows { row, count },
            Splice::InsertCols { col, count } => Splice::DeleteCols { col, count },
            Splice::DeleteCols { col, count } => Splice::InsertCols { col, count },
            Splice::MoveRows { row, count, to } => Splice::MoveRows { row: to, count, to: row },
        }
    }
}

impl std::fmt::Display for Splice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Splice::InsertRows { row, count } => write!(f, "insert {count} row(s) at {row}"),
            Splice::DeleteRows { row, count } => write!(f, "delete {count} row(s) at {row}"),
            Splice::InsertCols { col, count } => write!(f, "insert {count} column(s) at {col}"),
            Splice::DeleteCols { col, count } => write!(f, "delete {count} column(s) at {col}"),
            Splice::MoveRows { row, count, to } => {
                write!(f, "move {count} row(s) at {row} to {to}")
            }
        }
    }
}

/// Position in a [`SpliceJournal`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct JournalMark(usize);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub sheet: String,
    pub splice: Splice,
}

/// Ordered record of applied splices.
///
/// Callers take a [`JournalMark`] when they snapshot coordinate-keyed data
/// (e.g. style overrides) and later ask for the splices applied since.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpliceJournal {
    entries: Vec<JournalEntry>,
}

impl SpliceJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, sheet: impl Into<String>, splice: Splice) {
        self.entries.push(JournalEntry {
            sheet: sheet.into(),
            splice,
        });
    }

    pub fn mark(&self) -> JournalMark {
        JournalMark(self.entries.len())
    }

    /// Splices applied to `sheet` after `mark`, in application order.
    pub fn since(&self, mark: JournalMark, sheet: &str) -> Vec<Splice> {
        self.entries
            .get(mark.0..)
            .unwrap_or_default()
            .iter()
            .filter(|e| e.sheet.eq_ignore_ascii_case(sheet))
            .map(|e| e.splice)
            .collect()
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
