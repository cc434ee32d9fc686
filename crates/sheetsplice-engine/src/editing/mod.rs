//! Structural editing: splice descriptions, coordinate shifting and the
//! rewriting of everything anchored to coordinates.

pub mod formulas;
pub(crate) mod metadata;
pub mod shift;
mod splice;

pub use formulas::{rewrite_formula, rewrite_formula_on};
pub use shift::{
    shift_columns, shift_columns_for_insert, shift_point, shift_range, shift_range_set,
    shift_rows, shift_rows_for_insert, SheetLimits,
};
pub use splice::{Axis, JournalEntry, JournalMark, Splice, SpliceJournal};
