//! Coordinate shifting for row/column splices.
//!
//! Every range-anchored structure goes through these functions, so grid
//! cells, metadata and style-override keys move by exactly the same rules.
//! Inserts and deletes may remove an index; moves only permute them.

use sheetsplice_model::{CellRef, Range, RangeSet, EXCEL_MAX_COLS, EXCEL_MAX_ROWS};

use super::{Axis, Splice};

/// Sheet bounds used to clamp inserts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SheetLimits {
    pub max_rows: u32,
    pub max_cols: u32,
}

impl SheetLimits {
    pub const EXCEL: SheetLimits = SheetLimits {
        max_rows: EXCEL_MAX_ROWS,
        max_cols: EXCEL_MAX_COLS,
    };

    pub fn max(&self, axis: Axis) -> u32 {
        match axis {
            Axis::Rows => self.max_rows,
            Axis::Cols => self.max_cols,
        }
    }
}

impl Default for SheetLimits {
    fn default() -> Self {
        Self::EXCEL
    }
}

/// New index of `i` after deleting `count` indices starting at `del_start`.
///
/// `None` when `i` itself was deleted.
pub fn shift_index_delete(i: u32, del_start: u32, count: u32) -> Option<u32> {
    let del_end = del_start.saturating_add(count.saturating_sub(1));
    if i < del_start {
        Some(i)
    } else if i > del_end {
        Some(i - count)
    } else {
        None
    }
}

/// New index of `i` after inserting `count` indices at `at`.
///
/// `None` when `i` is pushed past `max`.
pub fn shift_index_insert(i: u32, at: u32, count: u32, max: u32) -> Option<u32> {
    if i < at {
        return Some(i);
    }
    i.checked_add(count).filter(|n| *n <= max)
}

/// Shift an inclusive `[start, end]` span for a delete.
///
/// Boundaries inside the deleted span are pulled to its edge, so a span that
/// only partially overlaps is narrowed; a span entirely inside is removed.
pub fn shift_span_delete(start: u32, end: u32, del_start: u32, count: u32) -> Option<(u32, u32)> {
    let del_end = del_start.saturating_add(count.saturating_sub(1));
    if end < del_start {
        return Some((start, end));
    }
    if start > del_end {
        return Some((start - count, end - count));
    }
    if start >= del_start && end <= del_end {
        return None;
    }

    let new_start = if start >= del_start { del_start } else { start };
    let new_end = if end <= del_end {
        // `del_start > start >= 1` here, so this cannot underflow.
        del_start - 1
    } else {
        end - count
    };

    (new_start <= new_end).then_some((new_start, new_end))
}

/// Shift an inclusive `[start, end]` span for an insert.
///
/// Spans containing the insert point grow; ends are clamped to `max` and a
/// span pushed entirely past `max` is removed.
pub fn shift_span_insert(start: u32, end: u32, at: u32, count: u32, max: u32) -> Option<(u32, u32)> {
    let new_start = if start >= at {
        start.checked_add(count)?
    } else {
        start
    };
    if new_start > max {
        return None;
    }
    let new_end = if end >= at {
        end.saturating_add(count).min(max)
    } else {
        end
    };
    Some((new_start, new_end))
}

/// New index of `i` after the `count` indices at `from` are moved to start at `to`.
///
/// Indices between the block and its destination close ranks; nothing is lost.
pub fn shift_index_move(i: u32, from: u32, count: u32, to: u32) -> u32 {
    let from_end = from.saturating_add(count.saturating_sub(1));
    if (from..=from_end).contains(&i) {
        to.saturating_add(i - from)
    } else if to < from && (to..from).contains(&i) {
        i.saturating_add(count)
    } else if to > from && i > from_end && i <= to.saturating_add(count.saturating_sub(1)) {
        i - count
    } else {
        i
    }
}

/// Shift an inclusive `[start, end]` span for a move.
///
/// A span covering both the block and its destination keeps its bounds;
/// otherwise each boundary follows its own index.
pub fn shift_span_move(start: u32, end: u32, from: u32, count: u32, to: u32) -> (u32, u32) {
    let lo = from.min(to);
    let hi = from.max(to).saturating_add(count.saturating_sub(1));
    if start <= lo && end >= hi {
        return (start, end);
    }
    let a = shift_index_move(start, from, count, to);
    let b = shift_index_move(end, from, count, to);
    (a.min(b), a.max(b))
}

/// Shift one index along the splice axis.
pub fn shift_index(i: u32, splice: &Splice, limits: SheetLimits) -> Option<u32> {
    let max = limits.max(splice.axis());
    if let Some(to) = splice.move_target() {
        Some(shift_index_move(i, splice.index(), splice.count(), to))
    } else if splice.is_delete() {
        shift_index_delete(i, splice.index(), splice.count())
    } else {
        shift_index_insert(i, splice.index(), splice.count(), max)
    }
}

/// Shift one span along the splice axis.
pub fn shift_span(start: u32, end: u32, splice: &Splice, limits: SheetLimits) -> Option<(u32, u32)> {
    let max = limits.max(splice.axis());
    if let Some(to) = splice.move_target() {
        Some(shift_span_move(start, end, splice.index(), splice.count(), to))
    } else if splice.is_delete() {
        shift_span_delete(start, end, splice.index(), splice.count())
    } else {
        shift_span_insert(start, end, splice.index(), splice.count(), max)
    }
}

/// Where a single cell lands after `splice`; `None` if it was deleted.
pub fn shift_point(cell: CellRef, splice: &Splice, limits: SheetLimits) -> Option<CellRef> {
    match splice.axis() {
        Axis::Rows => shift_index(cell.row, splice, limits).map(|row| CellRef::new(row, cell.col)),
        Axis::Cols => shift_index(cell.col, splice, limits).map(|col| CellRef::new(cell.row, col)),
    }
}

/// Where a rectangle lands after `splice`; `None` if it collapsed.
pub fn shift_range(range: Range, splice: &Splice, limits: SheetLimits) -> Option<Range> {
    match splice.axis() {
        Axis::Rows => {
            let (start, end) = shift_span(range.start.row, range.end.row, splice, limits)?;
            Some(Range::from_bounds(start, range.start.col, end, range.end.col))
        }
        Axis::Cols => {
            let (start, end) = shift_span(range.start.col, range.end.col, splice, limits)?;
            Some(Range::from_bounds(range.start.row, start, range.end.row, end))
        }
    }
}

/// Shift every rectangle of a set, dropping the ones that collapse.
///
/// An empty result means the whole set vanished.
pub fn shift_range_set(set: &RangeSet, splice: &Splice, limits: SheetLimits) -> RangeSet {
    set.ranges()
        .iter()
        .filter_map(|r| shift_range(*r, splice, limits))
        .collect()
}

/// Shift a set for the deletion of columns `[deleted_start, deleted_start + deleted_count)`.
pub fn shift_columns(set: &RangeSet, deleted_start: u32, deleted_count: u32) -> RangeSet {
    let splice = Splice::DeleteCols {
        col: deleted_start,
        count: deleted_count,
    };
    shift_range_set(set, &splice, SheetLimits::EXCEL)
}

/// Shift a set for the deletion of rows `[deleted_start, deleted_start + deleted_count)`.
pub fn shift_rows(set: &RangeSet, deleted_start: u32, deleted_count: u32) -> RangeSet {
    let splice = Splice::DeleteRows {
        row: deleted_start,
        count: deleted_count,
    };
    shift_range_set(set, &splice, SheetLimits::EXCEL)
}

/// Shift a set for `insert_count` columns inserted before `insert_start`.
pub fn shift_columns_for_insert(set: &RangeSet, insert_start: u32, insert_count: u32) -> RangeSet {
    let splice = Splice::InsertCols {
        col: insert_start,
        count: insert_count,
    };
    shift_range_set(set, &splice, SheetLimits::EXCEL)
}

/// Shift a set for `insert_count` rows inserted before `insert_start`.
pub fn shift_rows_for_insert(set: &RangeSet, insert_start: u32, insert_count: u32) -> RangeSet {
    let splice = Splice::InsertRows {
        row: insert_start,
        count: insert_count,
    };
    shift_range_set(set, &splice, SheetLimits::EXCEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(text: &str) -> RangeSet {
        RangeSet::parse(text).unwrap()
    }

    #[test]
    fn delete_span_cases() {
        // before, after, inside, straddling left/right edges, covering
        assert_eq!(shift_span_delete(1, 2, 5, 2), Some((1, 2)));
        assert_eq!(shift_span_delete(8, 9, 5, 2), Some((6, 7)));
        assert_eq!(shift_span_delete(5, 6, 5, 2), None);
        assert_eq!(shift_span_delete(3, 5, 5, 2), Some((3, 4)));
        assert_eq!(shift_span_delete(6, 9, 5, 2), Some((5, 7)));
        assert_eq!(shift_span_delete(2, 9, 5, 2), Some((2, 7)));
        assert_eq!(shift_span_delete(1, 1, 1, 1), None);
    }

    #[test]
    fn insert_span_cases() {
        assert_eq!(shift_span_insert(1, 2, 5, 2, 100), Some((1, 2)));
        assert_eq!(shift_span_insert(5, 6, 5, 2, 100), Some((7, 8)));
        assert_eq!(shift_span_insert(3, 5, 5, 2, 100), Some((3, 7)));
        assert_eq!(shift_span_insert(90, 99, 5, 5, 100), Some((95, 100)));
        assert_eq!(shift_span_insert(99, 100, 5, 5, 100), None);
    }

    #[test]
    fn moved_rows_close_ranks() {
        // Row 5 moved down to row 10, then back up.
        let moved: Vec<u32> = (3..=11).map(|i| shift_index_move(i, 5, 1, 10)).collect();
        assert_eq!(moved, [3, 4, 10, 5, 6, 7, 8, 9, 11]);
        let back: Vec<u32> = moved.iter().map(|&i| shift_index_move(i, 10, 1, 5)).collect();
        assert_eq!(back, (3..=11).collect::<Vec<_>>());

        // Two rows moved up.
        assert_eq!(shift_index_move(8, 8, 2, 2), 2);
        assert_eq!(shift_index_move(9, 8, 2, 2), 3);
        assert_eq!(shift_index_move(2, 8, 2, 2), 4);
        assert_eq!(shift_index_move(7, 8, 2, 2), 9);
        assert_eq!(shift_index_move(10, 8, 2, 2), 10);
    }

    #[test]
    fn move_span_cases() {
        // covering, inside the block, straddling the block edge, untouched
        assert_eq!(shift_span_move(1, 20, 5, 1, 10), (1, 20));
        assert_eq!(shift_span_move(5, 10, 5, 1, 10), (5, 10));
        assert_eq!(shift_span_move(5, 6, 5, 2, 10), (10, 11));
        assert_eq!(shift_span_move(3, 6, 5, 1, 10), (3, 5));
        assert_eq!(shift_span_move(6, 12, 10, 1, 5), (7, 12));
        assert_eq!(shift_span_move(1, 3, 5, 1, 10), (1, 3));
    }

    #[test]
    fn column_rule_on_deleted_column_vanishes() {
        assert!(shift_columns(&set("BI2:BI100"), 61, 1).is_empty());
        assert_eq!(shift_columns(&set("BI2:BI100"), 1, 1).format(), "BH2:BH100");
    }

    #[test]
    fn partial_overlap_narrows_one_axis_only() {
        assert_eq!(shift_columns(&set("B2:F9 H1"), 3, 2).format(), "B2:D9 F1");
        assert_eq!(shift_rows(&set("A1:C10"), 1, 3).format(), "A1:C7");
        assert_eq!(shift_rows(&set("A4"), 1, 3).format(), "A1");
    }

    #[test]
    fn insert_expands_spanning_ranges() {
        assert_eq!(shift_columns_for_insert(&set("A1:C3 D4"), 2, 2).format(), "A1:E3 F4");
        assert_eq!(shift_rows_for_insert(&set("A1:A1"), 1, 1).format(), "A2");
    }

    #[test]
    fn points_follow_the_same_rules() {
        let limits = SheetLimits::EXCEL;
        let del = Splice::DeleteCols { col: 1, count: 1 };
        assert_eq!(shift_point(CellRef::new(22, 6), &del, limits), Some(CellRef::new(22, 5)));
        assert_eq!(shift_point(CellRef::new(22, 1), &del, limits), None);

        let ins = Splice::InsertRows { row: 3, count: 2 };
        assert_eq!(shift_point(CellRef::new(3, 1), &ins, limits), Some(CellRef::new(5, 1)));
        assert_eq!(
            shift_point(CellRef::new(EXCEL_MAX_ROWS, 1), &ins, limits),
            None
        );
    }
}
