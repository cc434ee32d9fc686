use sheetsplice_model::{rewrite_a1_references, CellValue, FormulaReference, Worksheet};

use super::shift::{shift_range, SheetLimits};
use super::Splice;

const REF_ERROR: &str = "#REF!";

/// Rewrite the unqualified A1 references in `formula` for `splice`.
///
/// References that were deleted outright (or pushed off the sheet) become
/// `#REF!`; partially deleted ranges shrink; `$` anchors are kept.
pub fn rewrite_formula(formula: &str, splice: &Splice, limits: SheetLimits) -> String {
    rewrite_matching(formula, splice, limits, |found| found.sheet.is_none())
}

/// Rewrite the references in a formula living on `host_sheet` that point at
/// `spliced_sheet`: unqualified ones when the two are the same sheet, and
/// every `spliced_sheet!A1` form. Sheet names compare case-insensitively.
pub fn rewrite_formula_on(
    formula: &str,
    host_sheet: &str,
    spliced_sheet: &str,
    splice: &Splice,
    limits: SheetLimits,
) -> String {
    let local = host_sheet.eq_ignore_ascii_case(spliced_sheet);
    rewrite_matching(formula, splice, limits, |found| match &found.sheet {
        None => local,
        Some(name) => name.eq_ignore_ascii_case(spliced_sheet),
    })
}

fn rewrite_matching(
    formula: &str,
    splice: &Splice,
    limits: SheetLimits,
    applies: impl Fn(&FormulaReference) -> bool,
) -> String {
    rewrite_a1_references(formula, |found| {
        if !applies(found) {
            return None;
        }
        let reference = &found.reference;
        let before = reference.range();
        match shift_range(before, splice, limits) {
            None => Some(REF_ERROR.to_string()),
            Some(after) if after == before => None,
            Some(after) => Some(reference.with_range(after).to_string()),
        }
    })
}

/// Rewrite cell, conditional-formatting and data-validation formulas of
/// `sheet` for a splice applied to `spliced_sheet`.
///
/// Returns how many formula strings changed.
pub(crate) fn rewrite_sheet_formulas(
    sheet: &mut Worksheet,
    spliced_sheet: &str,
    splice: &Splice,
    limits: SheetLimits,
) -> usize {
    let host = sheet.name.clone();
    let mut changed = 0usize;
    let mut rewrite = |text: &mut String| {
        let next = rewrite_formula_on(text, &host, spliced_sheet, splice, limits);
        if next != *text {
            *text = next;
            changed += 1;
        }
    };

    for (_, cell) in sheet.iter_cells_mut() {
        if let CellValue::Formula(text) = &mut cell.value {
            rewrite(text);
        }
    }
    for block in &mut sheet.conditional_formatting {
        for rule in &mut block.rules {
            for formula in rule.formulas_mut() {
                rewrite(formula);
            }
        }
    }
    for validation in &mut sheet.data_validations {
        for formula in validation.formulas_mut() {
            rewrite(formula);
        }
    }

    changed
}
