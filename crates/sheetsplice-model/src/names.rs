use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::naming::{looks_like_a1, looks_like_r1c1};
use crate::{AnchoredRange, RangeParseError};

pub const EXCEL_DEFINED_NAME_MAX_LEN: usize = 255;

fn is_false(v: &bool) -> bool {
    !*v
}

/// A sheet-scoped defined name. `refers_to` carries no leading `=` and may
/// be a reference, a constant or a formula.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DefinedName {
    pub name: String,
    pub refers_to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
}

impl DefinedName {
    pub fn new(
        name: impl Into<String>,
        refers_to: impl Into<String>,
    ) -> Result<Self, DefinedNameValidationError> {
        let name = name.into();
        validate_defined_name(&name)?;
        Ok(Self {
            name,
            refers_to: refers_to.into(),
            comment: None,
            hidden: false,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DefinedNameValidationError {
    #[error("defined name cannot be empty")]
    Empty,
    #[error("defined name has {len} characters, more than {max}")]
    TooLong { len: usize, max: usize },
    #[error("defined name cannot start with '{0}'")]
    InvalidStartCharacter(char),
    #[error("'{ch}' at position {index} is not allowed in a defined name")]
    InvalidCharacter { ch: char, index: usize },
    #[error("defined name reads as a cell reference")]
    LooksLikeCellReference,
}

/// Unicode letter, `_` or `\` first; letters, digits, `_` and `.` after.
pub fn validate_defined_name(name: &str) -> Result<(), DefinedNameValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DefinedNameValidationError::Empty);
    }
    let len = name.chars().count();
    if len > EXCEL_DEFINED_NAME_MAX_LEN {
        return Err(DefinedNameValidationError::TooLong {
            len,
            max: EXCEL_DEFINED_NAME_MAX_LEN,
        });
    }
    if looks_like_a1(name) || looks_like_r1c1(name) {
        return Err(DefinedNameValidationError::LooksLikeCellReference);
    }

    for (index, ch) in name.chars().enumerate() {
        let allowed = match index {
            0 => ch.is_alphabetic() || matches!(ch, '_' | '\\'),
            _ => ch.is_alphanumeric() || matches!(ch, '_' | '.'),
        };
        if !allowed {
            return Err(match index {
                0 => DefinedNameValidationError::InvalidStartCharacter(ch),
                _ => DefinedNameValidationError::InvalidCharacter { ch, index },
            });
        }
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum NameTargetError {
    #[error("defined name is a formula or constant, not a reference")]
    NotAReference,
    #[error("unterminated quoted sheet name")]
    UnterminatedQuote,
    #[error(transparent)]
    Range(#[from] RangeParseError),
}

/// One area of a reference-valued name, e.g. `'My Sheet'!$A$1:$B$2`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameArea {
    /// Written form of the sheet qualifier, quotes included.
    pub sheet_prefix: Option<String>,
    pub sheet: Option<String>,
    pub range: AnchoredRange,
}

impl NameArea {
    pub fn targets_sheet(&self, sheet: &str) -> bool {
        matches!(&self.sheet, Some(name) if name.eq_ignore_ascii_case(sheet))
    }
}

impl fmt::Display for NameArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sheet_prefix {
            Some(prefix) => write!(f, "{prefix}!{}", self.range),
            None => write!(f, "{}", self.range),
        }
    }
}

/// `[Sheet!]A1[:B2]` areas separated by commas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameTarget {
    pub areas: Vec<NameArea>,
}

impl NameTarget {
    pub fn parse(refers_to: &str) -> Result<Self, NameTargetError> {
        let text = refers_to.trim();
        let text = text.strip_prefix('=').unwrap_or(text);
        if is_expression(text) {
            return Err(NameTargetError::NotAReference);
        }
        let areas = split_outside_quotes(text)?
            .into_iter()
            .map(parse_area)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { areas })
    }
}

impl fmt::Display for NameTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sep = "";
        for area in &self.areas {
            write!(f, "{sep}{area}")?;
            sep = ",";
        }
        Ok(())
    }
}

/// Operators, calls, literals and booleans outside a quoted sheet name.
fn is_expression(text: &str) -> bool {
    let mut quoted = false;
    let operator = text.chars().any(|ch| {
        if ch == '\'' {
            quoted = !quoted;
        }
        !quoted && "()\"+-*/&^=<>{".contains(ch)
    });
    operator
        || text.starts_with(|c: char| c.is_ascii_digit())
        || ["TRUE", "FALSE"].iter().any(|b| text.eq_ignore_ascii_case(b))
}

fn split_outside_quotes(text: &str) -> Result<Vec<&str>, NameTargetError> {
    let mut parts = Vec::new();
    let mut quoted = false;
    let mut from = 0;
    for (i, ch) in text.char_indices() {
        if ch == '\'' {
            quoted = !quoted;
        } else if ch == ',' && !quoted {
            parts.push(&text[from..i]);
            from = i + 1;
        }
    }
    if quoted {
        return Err(NameTargetError::UnterminatedQuote);
    }
    parts.push(&text[from..]);
    Ok(parts)
}

/// Splits `'It''s'!rest` into the written prefix, the unescaped sheet name
/// and `rest`.
fn split_quoted_sheet(text: &str) -> Result<(&str, String, &str), NameTargetError> {
    let mut sheet = String::new();
    let mut chars = text.char_indices().skip(1).peekable();
    while let Some((i, ch)) = chars.next() {
        if ch != '\'' {
            sheet.push(ch);
            continue;
        }
        if chars.next_if(|&(_, next)| next == '\'').is_some() {
            sheet.push('\'');
            continue;
        }
        let rest = text[i + 1..]
            .strip_prefix('!')
            .ok_or(NameTargetError::UnterminatedQuote)?;
        return Ok((&text[..=i], sheet, rest));
    }
    Err(NameTargetError::UnterminatedQuote)
}

fn parse_area(text: &str) -> Result<NameArea, NameTargetError> {
    let text = text.trim();
    let (sheet_prefix, sheet, rest) = if text.starts_with('\'') {
        let (prefix, sheet, rest) = split_quoted_sheet(text)?;
        (Some(prefix.to_string()), Some(sheet), rest)
    } else {
        match text.rsplit_once('!') {
            Some((sheet, rest)) => (Some(sheet.to_string()), Some(sheet.to_string()), rest),
            None => (None, None, text),
        }
    };
    Ok(NameArea {
        sheet_prefix,
        sheet,
        range: AnchoredRange::parse(rest)?,
    })
}
