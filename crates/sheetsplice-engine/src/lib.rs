//! `sheetsplice-engine` applies row/column inserts, deletes and row moves to a
//! [`sheetsplice_model::Workbook`] while keeping everything anchored to
//! coordinates consistent:
//! - cells, column/row records and formulas move with the splice, including
//!   `Sheet!A1` references to the spliced sheet from other sheets
//! - merges, conditional formatting, data validations, tables, the sheet
//!   autofilter and defined names are shifted, shrunk or dropped
//! - the sheet extent is maintained, and metadata clipped to it
//!
//! Style overrides captured before a series of splices can be rebound to their
//! new coordinates with [`style_binding`].

pub mod config;
pub mod editing;
mod engine;
mod error;
pub mod extent;
pub mod style_binding;

pub use config::{ConfigError, SpliceConfig};
pub use editing::{
    rewrite_formula, rewrite_formula_on, shift_point, shift_range, shift_range_set, Axis,
    JournalEntry, JournalMark, SheetLimits, Splice, SpliceJournal,
};
pub use engine::{SpliceEngine, SpliceOutcome};
pub use error::{MetadataKind, MetadataRewriteWarning, SpliceError, WarningReason};
pub use style_binding::{
    BorderPatch, KeyBaseConfig, StyleDiagnostic, StyleDiagnosticReason, StyleKey,
    StyleOverrideRequest, StylePatch, StyleResolution, Translation,
};
