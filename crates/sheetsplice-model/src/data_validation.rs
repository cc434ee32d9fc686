use serde::{Deserialize, Serialize};

use crate::{RangeParseError, RangeSet};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataValidationKind {
    #[default]
    Any,
    Whole,
    Decimal,
    List,
    Date,
    Time,
    TextLength,
    Custom,
}

/// A `<dataValidation>` entry.
///
/// Like conditional formatting, the target is kept as `sqref` text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataValidation {
    pub sqref: String,
    #[serde(default)]
    pub kind: DataValidationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula2: Option<String>,
    #[serde(default)]
    pub allow_blank: bool,
}

impl DataValidation {
    pub fn ranges(&self) -> Result<RangeSet, RangeParseError> {
        RangeSet::parse(&self.sqref)
    }

    pub fn formulas_mut(&mut self) -> impl Iterator<Item = &mut String> {
        self.formula1.iter_mut().chain(self.formula2.iter_mut())
    }
}
