use sheetsplice_model::{Range, Workbook, Worksheet};

use crate::config::{ConfigError, SpliceConfig};
use crate::editing::formulas::rewrite_sheet_formulas;
use crate::editing::metadata::{clip_to_extent, rewrite_metadata, rewrite_names_targeting};
use crate::editing::shift::{shift_index, shift_point, SheetLimits};
use crate::editing::{Splice, SpliceJournal};
use crate::error::{MetadataRewriteWarning, SpliceError};
use crate::extent;

/// Result of a successful splice.
#[derive(Debug, Clone, PartialEq)]
pub struct SpliceOutcome {
    pub splice: Splice,
    /// The sheet extent after the splice.
    pub extent: Option<Range>,
    /// Metadata entries dropped while rewriting.
    pub warnings: Vec<MetadataRewriteWarning>,
}

/// Applies row/column splices to worksheets.
///
/// The engine only holds configuration; every mutating call borrows the
/// document mutably, so a single document is never spliced concurrently.
#[derive(Debug, Clone, Default)]
pub struct SpliceEngine {
    config: SpliceConfig,
}

impl SpliceEngine {
    pub fn new(config: SpliceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SpliceConfig {
        &self.config
    }

    fn limits(&self) -> SheetLimits {
        SheetLimits {
            max_rows: self.config.max_rows,
            max_cols: self.config.max_cols,
        }
    }

    pub fn insert_columns(
        &self,
        workbook: &mut Workbook,
        sheet: &str,
        index: u32,
        count: u32,
    ) -> Result<SpliceOutcome, SpliceError> {
        self.apply_to_workbook(workbook, sheet, Splice::InsertCols { col: index, count })
    }

    pub fn delete_columns(
        &self,
        workbook: &mut Workbook,
        sheet: &str,
        index: u32,
        count: u32,
    ) -> Result<SpliceOutcome, SpliceError> {
        self.apply_to_workbook(workbook, sheet, Splice::DeleteCols { col: index, count })
    }

    pub fn insert_rows(
        &self,
        workbook: &mut Workbook,
        sheet: &str,
        index: u32,
        count: u32,
    ) -> Result<SpliceOutcome, SpliceError> {
        self.apply_to_workbook(workbook, sheet, Splice::InsertRows { row: index, count })
    }

    pub fn delete_rows(
        &self,
        workbook: &mut Workbook,
        sheet: &str,
        index: u32,
        count: u32,
    ) -> Result<SpliceOutcome, SpliceError> {
        self.apply_to_workbook(workbook, sheet, Splice::DeleteRows { row: index, count })
    }

    /// Move `count` rows starting at `from` so that they start at `to`.
    ///
    /// Cells, styles, row records, formulas and metadata travel with the
    /// rows; the rows in between close ranks.
    pub fn move_rows(
        &self,
        workbook: &mut Workbook,
        sheet: &str,
        from: u32,
        count: u32,
        to: u32,
    ) -> Result<SpliceOutcome, SpliceError> {
        self.apply_to_workbook(workbook, sheet, Splice::MoveRows { row: from, count, to })
    }

    /// Apply `splice` to a workbook sheet and record it in `journal` on success.
    pub fn apply_recorded(
        &self,
        workbook: &mut Workbook,
        sheet: &str,
        splice: Splice,
        journal: &mut SpliceJournal,
    ) -> Result<SpliceOutcome, SpliceError> {
        let outcome = self.apply_to_workbook(workbook, sheet, splice)?;
        journal.record(sheet, splice);
        Ok(outcome)
    }

    /// Apply `splice` to the named sheet.
    ///
    /// Defined names and formulas on other sheets that point at the spliced
    /// sheet (`Sheet1!$A$1`) are rewritten too.
    pub fn apply_to_workbook(
        &self,
        workbook: &mut Workbook,
        sheet: &str,
        splice: Splice,
    ) -> Result<SpliceOutcome, SpliceError> {
        let idx = workbook
            .sheets
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(sheet))
            .ok_or_else(|| SpliceError::SheetNotFound(sheet.to_string()))?;

        let mut outcome = self.apply(&mut workbook.sheets[idx], splice)?;

        let target = workbook.sheets[idx].name.clone();
        let limits = self.limits();
        let mut warnings = Vec::new();
        for (i, other) in workbook.sheets.iter_mut().enumerate() {
            if i == idx {
                continue;
            }
            rewrite_names_targeting(other, &target, &splice, limits, &mut warnings);
            if self.config.rewrite_formulas {
                let changed = rewrite_sheet_formulas(other, &target, &splice, limits);
                if changed > 0 {
                    log::debug!(
                        "splice `{target}`: rewrote {changed} formula(s) on `{}`",
                        other.name
                    );
                }
            }
        }
        for warning in &warnings {
            log::warn!("{warning}");
        }
        outcome.warnings.extend(warnings);
        Ok(outcome)
    }

    /// Check `splice` against the sheet, returning the sheet's current extent.
    pub fn validate(&self, sheet: &Worksheet, splice: &Splice) -> Result<Option<Range>, SpliceError> {
        let index = splice.index();
        let count = splice.count();
        if index == 0 {
            return Err(SpliceError::InvalidIndex { index });
        }
        if count == 0 {
            return Err(SpliceError::InvalidCount);
        }

        let axis = splice.axis();
        let limit = self.limits().max(axis);
        let out_of_bounds = SpliceError::OutOfBounds {
            axis,
            index,
            count,
            limit,
        };

        let current = extent::recompute(sheet);
        let used = current.map_or(0, |e| axis.of(e.end));
        let fits = |start: u32| start.checked_add(count - 1).is_some_and(|last| last <= limit);

        if let Some(to) = splice.move_target() {
            if to == 0 {
                return Err(SpliceError::InvalidIndex { index: to });
            }
            if index > used || !fits(index) || !fits(to) {
                return Err(out_of_bounds);
            }
        } else if splice.is_delete() {
            if index > used || !fits(index) {
                return Err(out_of_bounds);
            }
        } else {
            if index > limit || index > used.saturating_add(1) {
                return Err(out_of_bounds);
            }
            // Only content at or after `index` moves.
            if index <= used && used.checked_add(count).map_or(true, |end| end > limit) {
                return Err(out_of_bounds);
            }
        }

        Ok(current)
    }

    /// Apply `splice` to one worksheet.
    ///
    /// The splice is validated first and computed on a scratch copy that
    /// replaces `sheet` only on success.
    pub fn apply(&self, sheet: &mut Worksheet, splice: Splice) -> Result<SpliceOutcome, SpliceError> {
        let previous = self.validate(sheet, &splice)?;
        log::debug!("splice `{}`: {splice} (extent {:?})", sheet.name, previous);

        let limits = self.limits();
        let mut scratch = sheet.clone();
        let mut warnings = Vec::new();

        let mut removed = shift_cells(&mut scratch, &splice, limits);
        shift_column_defs(&mut scratch, &splice, limits, &mut removed);
        shift_row_defs(&mut scratch, &splice, limits, &mut removed);

        if self.config.rewrite_formulas {
            let name = scratch.name.clone();
            let changed = rewrite_sheet_formulas(&mut scratch, &name, &splice, limits);
            log::debug!("splice `{}`: rewrote {changed} formula(s)", scratch.name);
        }
        rewrite_metadata(&mut scratch, &splice, limits, &mut warnings);

        let extent = extent::adjust_for_splice(previous, &splice, removed, &scratch);
        if self.config.clip_metadata_to_extent {
            clip_to_extent(&mut scratch, extent, &mut warnings);
        }
        scratch.dimension = extent;

        for warning in &warnings {
            log::warn!("{warning}");
        }
        log::debug!(
            "splice `{}`: done (extent {:?}, {} warning(s))",
            scratch.name,
            extent,
            warnings.len()
        );

        *sheet = scratch;
        Ok(SpliceOutcome {
            splice,
            extent,
            warnings,
        })
    }
}

fn widen(removed: &mut Option<Range>, range: Range) {
    *removed = Some(match *removed {
        Some(r) => r.union(&range),
        None => range,
    });
}

/// Move grid cells, returning the bounding box of the cells that were deleted.
fn shift_cells(sheet: &mut Worksheet, splice: &Splice, limits: SheetLimits) -> Option<Range> {
    let mut removed = None;
    let cells: Vec<_> = sheet.drain_cells().collect();
    for (at, cell) in cells {
        match shift_point(at, splice, limits) {
            Some(to) => sheet.set_cell(to, cell),
            None => widen(&mut removed, Range::new(at, at)),
        }
    }
    removed
}

/// Splice the dense column list. Removed explicit records widen `removed`
/// at row 1, which makes the extent fall back to a rescan.
fn shift_column_defs(
    sheet: &mut Worksheet,
    splice: &Splice,
    limits: SheetLimits,
    removed: &mut Option<Range>,
) {
    if splice.axis() != crate::editing::Axis::Cols {
        return;
    }
    let start = (splice.index() - 1) as usize;
    let count = splice.count() as usize;
    let len = sheet.column_defs.len();

    if splice.is_delete() {
        if start < len {
            let end = start.saturating_add(count).min(len);
            for (offset, def) in sheet.column_defs.drain(start..end).enumerate() {
                if def.is_explicit() {
                    let col = (start + offset) as u32 + 1;
                    widen(removed, Range::from_bounds(1, col, 1, col));
                }
            }
        }
    } else if start < len {
        sheet.column_defs.splice(
            start..start,
            std::iter::repeat_with(Default::default).take(count),
        );
        sheet.column_defs.truncate(limits.max_cols as usize);
    }
    sheet.trim_column_defs();
}

fn shift_row_defs(
    sheet: &mut Worksheet,
    splice: &Splice,
    limits: SheetLimits,
    removed: &mut Option<Range>,
) {
    if splice.axis() != crate::editing::Axis::Rows {
        return;
    }
    for (row, def) in std::mem::take(&mut sheet.row_defs) {
        match shift_index(row, splice, limits) {
            Some(to) => sheet.set_row_def(to, def),
            None if def.is_explicit() => widen(removed, Range::from_bounds(row, 1, row, 1)),
            None => {}
        }
    }
}
