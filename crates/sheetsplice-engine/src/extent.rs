//! Used-range ("extent") tracking.
//!
//! [`recompute`] is the reference semantics; [`adjust_for_splice`] is the
//! incremental path the engine takes after a splice, checked against a full
//! rescan in debug builds.

use sheetsplice_model::{Range, Worksheet};

use crate::editing::shift::shift_span_delete;
use crate::editing::{Axis, Splice};

#[derive(Clone, Copy, Default)]
struct Bounds {
    rows: Option<(u32, u32)>,
    cols: Option<(u32, u32)>,
}

fn widen(span: &mut Option<(u32, u32)>, i: u32) {
    *span = Some(match *span {
        None => (i, i),
        Some((lo, hi)) => (lo.min(i), hi.max(i)),
    });
}

/// Minimal bounding rectangle of the sheet's meaningful content.
///
/// Counted: every stored cell (stored cells always carry a value or a
/// non-default style), every explicit row record (row axis) and every explicit
/// column record (column axis). When only one axis has contributors the other
/// axis is `1..=1`. `None` means the sheet has no content at all.
pub fn recompute(sheet: &Worksheet) -> Option<Range> {
    let mut bounds = Bounds::default();

    for (at, cell) in sheet.iter_cells() {
        if cell.is_truly_empty() {
            continue;
        }
        widen(&mut bounds.rows, at.row);
        widen(&mut bounds.cols, at.col);
    }
    for (row, def) in &sheet.row_defs {
        if def.is_explicit() {
            widen(&mut bounds.rows, *row);
        }
    }
    for (idx, def) in sheet.column_defs.iter().enumerate() {
        if def.is_explicit() {
            widen(&mut bounds.cols, idx as u32 + 1);
        }
    }

    match (bounds.rows, bounds.cols) {
        (None, None) => None,
        (rows, cols) => {
            let (r0, r1) = rows.unwrap_or((1, 1));
            let (c0, c1) = cols.unwrap_or((1, 1));
            Some(Range::from_bounds(r0, c0, r1, c1))
        }
    }
}

/// Extent after `splice`, given the extent before it and the bounding box of
/// the content the splice removed.
///
/// Inserts and deletes that removed nothing on the previous boundary are
/// delta-adjusted; anything else falls back to [`recompute`].
pub fn adjust_for_splice(
    previous: Option<Range>,
    splice: &Splice,
    removed: Option<Range>,
    sheet: &Worksheet,
) -> Option<Range> {
    let result = match incremental(previous, splice, removed, sheet) {
        Some(extent) => Some(extent),
        None => {
            log::trace!("extent: full rescan after {splice}");
            recompute(sheet)
        }
    };
    debug_assert_eq!(result, recompute(sheet), "incremental extent diverged after {splice}");
    result
}

/// The delta-adjusted extent, or `None` to request a rescan.
fn incremental(
    previous: Option<Range>,
    splice: &Splice,
    removed: Option<Range>,
    sheet: &Worksheet,
) -> Option<Range> {
    let prev = previous?;
    // Moves permute rows; the new bounds need a rescan.
    if splice.move_target().is_some() {
        return None;
    }
    // With no cells, an axis may be defaulted to `1..=1` and does not move.
    if sheet.cell_count() == 0 {
        return None;
    }
    let axis = splice.axis();
    let (lo, hi) = span(prev, axis);

    let (new_lo, new_hi) = match splice.deleted_span() {
        None => {
            let at = splice.index();
            let count = splice.count();
            let shift = |i: u32| if i >= at { i.checked_add(count) } else { Some(i) };
            (shift(lo)?, shift(hi)?)
        }
        Some((first, last)) => {
            if (first <= lo && lo <= last) || (first <= hi && hi <= last) {
                return None;
            }
            if let Some(removed) = removed {
                let touches_rows =
                    removed.start.row <= prev.start.row || removed.end.row >= prev.end.row;
                let touches_cols =
                    removed.start.col <= prev.start.col || removed.end.col >= prev.end.col;
                if touches_rows || touches_cols {
                    return None;
                }
            }
            shift_span_delete(lo, hi, splice.index(), splice.count())?
        }
    };

    Some(match axis {
        Axis::Rows => Range::from_bounds(new_lo, prev.start.col, new_hi, prev.end.col),
        Axis::Cols => Range::from_bounds(prev.start.row, new_lo, prev.end.row, new_hi),
    })
}

fn span(range: Range, axis: Axis) -> (u32, u32) {
    match axis {
        Axis::Rows => (range.start.row, range.end.row),
        Axis::Cols => (range.start.col, range.end.col),
    }
}
