//! Rewriting of range-anchored metadata for a splice, and clipping of that
//! metadata to the sheet extent.

use sheetsplice_model::{
    AutoFilter, CellRef, NameTarget, NameTargetError, Range, RangeSet, Table, Worksheet,
};

use super::shift::{shift_index, shift_range, shift_range_set, SheetLimits};
use super::{Axis, Splice};
use crate::error::{MetadataKind, MetadataRewriteWarning, WarningReason};

/// Rewrite every metadata collection of `sheet` for `splice`.
pub(crate) fn rewrite_metadata(
    sheet: &mut Worksheet,
    splice: &Splice,
    limits: SheetLimits,
    warnings: &mut Vec<MetadataRewriteWarning>,
) {
    rewrite_merges(
        sheet,
        |r| {
            // A merge split by a move cannot be kept.
            if splice.move_target().is_some() && !moves_rigidly(r, splice, limits) {
                return None;
            }
            shift_range(r, splice, limits)
        },
        warnings,
    );
    rewrite_sqref_blocks(sheet, |set| shift_range_set(set, splice, limits), warnings);
    rewrite_tables(sheet, splice, limits, warnings);

    if let Some(text) = sheet.auto_filter.take() {
        sheet.auto_filter = rewrite_single_range(&text, MetadataKind::AutoFilter, warnings, |r| {
            shift_range(r, splice, limits)
        });
    }

    let sheet_name = sheet.name.clone();
    rewrite_names(sheet, &sheet_name, true, splice, limits, warnings);
}

/// Whether the rows of `range` land as one unbroken block.
fn moves_rigidly(range: Range, splice: &Splice, limits: SheetLimits) -> bool {
    let Some(next) = shift_range(range, splice, limits) else {
        return false;
    };
    next == range
        || (next.height() == range.height()
            && shift_index(range.start.row, splice, limits) == Some(next.start.row))
}

/// Rewrite the defined names of `sheet` whose areas are qualified with
/// `target_sheet` (used for names living on other sheets).
pub(crate) fn rewrite_names_targeting(
    sheet: &mut Worksheet,
    target_sheet: &str,
    splice: &Splice,
    limits: SheetLimits,
    warnings: &mut Vec<MetadataRewriteWarning>,
) {
    rewrite_names(sheet, target_sheet, false, splice, limits, warnings);
}

fn rewrite_merges(
    sheet: &mut Worksheet,
    mut map: impl FnMut(Range) -> Option<Range>,
    warnings: &mut Vec<MetadataRewriteWarning>,
) {
    let mut kept = Vec::with_capacity(sheet.merges.len());
    for region in sheet.merges.iter() {
        match map(*region) {
            Some(next) if !next.is_single_cell() => kept.push(next),
            Some(_) | None => warnings.push(MetadataRewriteWarning::new(
                MetadataKind::Merge,
                region.to_string(),
                WarningReason::Collapsed,
            )),
        }
    }
    sheet.merges.replace(kept);
}

/// Conditional formatting and data validation blocks share the `sqref` shape.
fn rewrite_sqref_blocks(
    sheet: &mut Worksheet,
    mut map: impl FnMut(&RangeSet) -> RangeSet,
    warnings: &mut Vec<MetadataRewriteWarning>,
) {
    let mut rewrite = |sqref: &mut String, kind: MetadataKind| -> bool {
        let set = match RangeSet::parse(sqref) {
            Ok(set) => set,
            Err(err) => {
                warnings.push(MetadataRewriteWarning::new(
                    kind,
                    sqref.clone(),
                    WarningReason::Malformed(err.to_string()),
                ));
                return false;
            }
        };
        let next = map(&set);
        if next.is_empty() {
            let reason = WarningReason::Collapsed;
            warnings.push(MetadataRewriteWarning::new(kind, sqref.clone(), reason));
            return false;
        }
        if next != set {
            *sqref = next.format();
        }
        true
    };

    sheet
        .conditional_formatting
        .retain_mut(|cf| rewrite(&mut cf.sqref, MetadataKind::ConditionalFormatting));
    sheet
        .data_validations
        .retain_mut(|dv| rewrite(&mut dv.sqref, MetadataKind::DataValidation));
}

fn rewrite_single_range(
    text: &str,
    kind: MetadataKind,
    warnings: &mut Vec<MetadataRewriteWarning>,
    map: impl FnOnce(Range) -> Option<Range>,
) -> Option<String> {
    let range = match Range::from_a1(text) {
        Ok(range) => range,
        Err(err) => {
            warnings.push(MetadataRewriteWarning::new(
                kind,
                text,
                WarningReason::Malformed(err.to_string()),
            ));
            return None;
        }
    };
    match map(range) {
        Some(next) if next == range => Some(text.to_string()),
        Some(next) => Some(next.to_string()),
        None => {
            warnings.push(MetadataRewriteWarning::new(
                kind,
                text,
                WarningReason::Collapsed,
            ));
            None
        }
    }
}

fn rewrite_tables(
    sheet: &mut Worksheet,
    splice: &Splice,
    limits: SheetLimits,
    warnings: &mut Vec<MetadataRewriteWarning>,
) {
    sheet.tables.retain_mut(|table| {
        let range = match table.range() {
            Ok(range) => range,
            Err(err) => {
                warnings.push(MetadataRewriteWarning::new(
                    MetadataKind::Table,
                    table.name.clone(),
                    WarningReason::Malformed(err.to_string()),
                ));
                return false;
            }
        };

        if let (Axis::Rows, Some((first, last))) = (splice.axis(), splice.deleted_span()) {
            let overlaps = |(lo, hi): (u32, u32)| lo <= last && hi >= first;
            if header_rows(table, range).is_some_and(overlaps) {
                warnings.push(MetadataRewriteWarning::new(
                    MetadataKind::Table,
                    table.name.clone(),
                    WarningReason::HeaderRowDeleted,
                ));
                return false;
            }
            if totals_rows(table, range).is_some_and(overlaps) {
                table.totals_row_count = 0;
            }
        }

        let Some(next) = shift_range(range, splice, limits) else {
            warnings.push(MetadataRewriteWarning::new(
                MetadataKind::Table,
                table.name.clone(),
                WarningReason::Collapsed,
            ));
            return false;
        };

        if splice.move_target().is_some() {
            let lands_on = |row: u32, edge: u32| shift_index(row, splice, limits) == Some(edge);
            if table.header_row_count > 0 && !lands_on(range.start.row, next.start.row) {
                warnings.push(MetadataRewriteWarning::new(
                    MetadataKind::Table,
                    table.name.clone(),
                    WarningReason::HeaderRowMoved,
                ));
                return false;
            }
            if table.totals_row_count > 0 && !lands_on(range.end.row, next.end.row) {
                table.totals_row_count = 0;
            }
        }

        if splice.axis() == Axis::Cols {
            adjust_table_columns(table, range, splice);
        }

        if next.height() < table.min_height() || table.columns.is_empty() {
            warnings.push(MetadataRewriteWarning::new(
                MetadataKind::Table,
                table.name.clone(),
                WarningReason::Collapsed,
            ));
            return false;
        }

        table.reference = next.to_string();
        if let Some(filter) = &mut table.auto_filter {
            match filter
                .range()
                .ok()
                .and_then(|r| shift_range(r, splice, limits))
            {
                Some(r) => filter.reference = r.to_string(),
                None => table.auto_filter = Some(AutoFilter::new(next)),
            }
        }
        true
    });
}

/// Inclusive header row span of a table occupying `range`.
fn header_rows(table: &Table, range: Range) -> Option<(u32, u32)> {
    let count = table.header_row_count.checked_sub(1)?;
    Some((range.start.row, range.start.row.saturating_add(count)))
}

/// Inclusive totals row span of a table occupying `range`.
fn totals_rows(table: &Table, range: Range) -> Option<(u32, u32)> {
    let count = table.totals_row_count.checked_sub(1)?;
    Some((range.end.row.saturating_sub(count), range.end.row))
}

/// Keep table header columns (and filter column ids) in step with a column splice.
fn adjust_table_columns(table: &mut Table, range: Range, splice: &Splice) {
    let (start, end) = (range.start.col, range.end.col);
    let index = splice.index();
    let count = splice.count();
    match splice.deleted_span() {
        Some((first, last)) => {
            let lo = first.max(start);
            let hi = last.min(end);
            if lo <= hi {
                table.remove_columns(lo - start, hi - lo + 1);
            }
        }
        None => {
            // Inserting at the first column moves the whole table instead.
            if index > start && index <= end {
                table.insert_columns(index - start, count);
            }
        }
    }
}

fn rewrite_names(
    sheet: &mut Worksheet,
    target_sheet: &str,
    include_unqualified: bool,
    splice: &Splice,
    limits: SheetLimits,
    warnings: &mut Vec<MetadataRewriteWarning>,
) {
    sheet.defined_names.retain_mut(|name| {
        let mut target = match NameTarget::parse(&name.refers_to) {
            Ok(target) => target,
            // Constants and formulas carry no reference to shift.
            Err(NameTargetError::NotAReference) => return true,
            Err(err) => {
                if include_unqualified {
                    warnings.push(MetadataRewriteWarning::new(
                        MetadataKind::DefinedName,
                        name.name.clone(),
                        WarningReason::Malformed(err.to_string()),
                    ));
                    return false;
                }
                return true;
            }
        };

        let mut touched = false;
        target.areas.retain_mut(|area| {
            let applies = match &area.sheet {
                None => include_unqualified,
                Some(_) => area.targets_sheet(target_sheet),
            };
            if !applies {
                return true;
            }
            touched = true;
            match shift_range(area.range.range(), splice, limits) {
                Some(next) => {
                    area.range = area.range.with_range(next);
                    true
                }
                None => false,
            }
        });

        if !touched {
            return true;
        }
        if target.areas.is_empty() {
            warnings.push(MetadataRewriteWarning::new(
                MetadataKind::DefinedName,
                name.name.clone(),
                WarningReason::Collapsed,
            ));
            return false;
        }
        name.refers_to = target.to_string();
        true
    });
}

/// Narrow or drop metadata that lies outside `extent`.
///
/// A sheet without content (`None`) keeps no range-anchored metadata.
pub(crate) fn clip_to_extent(
    sheet: &mut Worksheet,
    extent: Option<Range>,
    warnings: &mut Vec<MetadataRewriteWarning>,
) {
    let bounds = extent.map(|e| Range::new(CellRef::new(1, 1), e.end));
    let clip = |r: Range| bounds.and_then(|b| r.intersection(&b));

    let mut kept = Vec::with_capacity(sheet.merges.len());
    for region in sheet.merges.iter() {
        match clip(*region) {
            Some(next) if !next.is_single_cell() => kept.push(next),
            Some(_) => warnings.push(MetadataRewriteWarning::new(
                MetadataKind::Merge,
                region.to_string(),
                WarningReason::Collapsed,
            )),
            None => warnings.push(MetadataRewriteWarning::new(
                MetadataKind::Merge,
                region.to_string(),
                WarningReason::OutsideExtent,
            )),
        }
    }
    sheet.merges.replace(kept);

    let mut clip_sqref = |sqref: &mut String, kind: MetadataKind| -> bool {
        // Unparseable text was already reported during the shift.
        let Ok(set) = RangeSet::parse(sqref) else {
            return true;
        };
        let next: RangeSet = set.ranges().iter().filter_map(|r| clip(*r)).collect();
        if next.is_empty() {
            warnings.push(MetadataRewriteWarning::new(
                kind,
                sqref.clone(),
                WarningReason::OutsideExtent,
            ));
            return false;
        }
        if next != set {
            *sqref = next.format();
        }
        true
    };
    sheet
        .conditional_formatting
        .retain_mut(|cf| clip_sqref(&mut cf.sqref, MetadataKind::ConditionalFormatting));
    sheet
        .data_validations
        .retain_mut(|dv| clip_sqref(&mut dv.sqref, MetadataKind::DataValidation));

    sheet.tables.retain_mut(|table| {
        let Ok(range) = table.range() else {
            return true;
        };
        let Some(next) = clip(range) else {
            warnings.push(MetadataRewriteWarning::new(
                MetadataKind::Table,
                table.name.clone(),
                WarningReason::OutsideExtent,
            ));
            return false;
        };
        if next == range {
            return true;
        }
        if next.end.row < range.end.row {
            table.totals_row_count = 0;
        }
        if next.height() < table.min_height() {
            warnings.push(MetadataRewriteWarning::new(
                MetadataKind::Table,
                table.name.clone(),
                WarningReason::OutsideExtent,
            ));
            return false;
        }
        let dropped_cols = range.end.col - next.end.col;
        if dropped_cols > 0 {
            table.remove_columns(next.width(), dropped_cols);
        }
        table.reference = next.to_string();
        if let Some(filter) = &mut table.auto_filter {
            filter.reference = next.to_string();
        }
        true
    });

    if let Some(text) = sheet.auto_filter.take() {
        sheet.auto_filter = match Range::from_a1(&text).ok().map(|r| (r, clip(r))) {
            Some((r, Some(next))) if next == r => Some(text),
            Some((_, Some(next))) => Some(next.to_string()),
            Some((_, None)) => {
                warnings.push(MetadataRewriteWarning::new(
                    MetadataKind::AutoFilter,
                    text,
                    WarningReason::OutsideExtent,
                ));
                None
            }
            None => Some(text),
        };
    }

    let sheet_name = sheet.name.clone();
    sheet.defined_names.retain_mut(|name| {
        let Ok(mut target) = NameTarget::parse(&name.refers_to) else {
            return true;
        };
        let mut changed = false;
        target.areas.retain_mut(|area| {
            if area.sheet.is_some() && !area.targets_sheet(&sheet_name) {
                return true;
            }
            let before = area.range.range();
            match clip(before) {
                Some(next) => {
                    if next != before {
                        area.range = area.range.with_range(next);
                        changed = true;
                    }
                    true
                }
                None => {
                    changed = true;
                    false
                }
            }
        });
        if target.areas.is_empty() {
            warnings.push(MetadataRewriteWarning::new(
                MetadataKind::DefinedName,
                name.name.clone(),
                WarningReason::OutsideExtent,
            ));
            return false;
        }
        if changed {
            name.refers_to = target.to_string();
        }
        true
    });
}
