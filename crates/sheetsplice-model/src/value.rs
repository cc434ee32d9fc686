use serde::{Deserialize, Serialize};

use crate::Font;

/// A cell value.
///
/// Serialized as `{"type": ..., "value": ...}` so payloads stay stable across
/// the IPC boundary.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Boolean(bool),
    RichText(RichText),
    /// Formula text without the leading `=`. Never recalculated here; only
    /// its references are rewritten by splices.
    Formula(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// The displayed text of string-like values.
    pub fn text(&self) -> Option<String> {
        match self {
            CellValue::Text(s) => Some(s.clone()),
            CellValue::RichText(rich) => Some(rich.plain_text()),
            _ => None,
        }
    }
}

/// Text made of runs, each optionally carrying its own font.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RichText {
    pub runs: Vec<TextRun>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    /// Font override for this run; `None` inherits the cell font.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
}

impl RichText {
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    pub fn push(&mut self, text: impl Into<String>, font: Option<Font>) {
        self.runs.push(TextRun {
            text: text.into(),
            font,
        });
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<RichText> for CellValue {
    fn from(rich: RichText) -> Self {
        Self::RichText(rich)
    }
}
