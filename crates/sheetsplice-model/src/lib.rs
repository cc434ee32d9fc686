//! `sheetsplice-model` defines the in-memory worksheet model mutated by the
//! splice engine.
//!
//! Everything here is plain data plus small invariant-keeping helpers:
//! - A1 addressing, range sets (`sqref`) and `$`-anchored references
//! - the sparse cell grid with shared/inline styles
//! - range-anchored metadata (merges, conditional formatting, data
//!   validations, tables, autofilter, defined names)
//!
//! All coordinates are **1-based**. Types are `serde`-serializable so they can
//! cross IPC boundaries as JSON.

mod address;
mod cell;
pub mod conditional_formatting;
mod data_validation;
pub mod formula_refs;
mod merge;
mod names;
mod naming;
mod range_set;
mod reference;
mod style;
pub mod table;
mod value;
mod workbook;
mod worksheet;

pub use address::{
    col_to_name, name_to_col, A1ParseError, CellRef, Range, RangeParseError, EXCEL_MAX_COLS,
    EXCEL_MAX_ROWS,
};
pub use cell::{Cell, CellKey, StyleRef};
pub use conditional_formatting::{
    CellIsOperator, CfRule, CfRuleKind, Cfvo, CfvoType, ConditionalFormatting, TopBottomKind,
};
pub use data_validation::{DataValidation, DataValidationKind};
pub use formula_refs::{
    a1_reference_spans, extract_a1_references, rewrite_a1_references, FormulaReference,
};
pub use merge::{MergeError, MergedRegions};
pub use names::{
    validate_defined_name, DefinedName, DefinedNameValidationError, NameArea, NameTarget,
    NameTargetError, EXCEL_DEFINED_NAME_MAX_LEN,
};
pub use range_set::{format_sqref, parse_sqref, RangeSet};
pub use reference::{AnchoredCell, AnchoredRange};
pub use style::{
    Border, BorderStyle, Color, ColorParseError, Fill, FillPattern, Font, Style, StyleTable,
};
pub use table::{
    validate_table_name, AutoFilter, FilterColumn, Table, TableColumn, TableError, TableStyleInfo,
};
pub use value::{CellValue, RichText, TextRun};
pub use workbook::{
    validate_sheet_name, Workbook, WorkbookError, EXCEL_MAX_SHEET_NAME_LEN, SCHEMA_VERSION,
};
pub use worksheet::{ColumnDef, RowDef, SourcePart, Worksheet};
