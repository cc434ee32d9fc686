use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const EXCEL_MAX_ROWS: u32 = 1_048_576;
/// Column `XFD`.
pub const EXCEL_MAX_COLS: u32 = 16_384;

/// One cell, 1-based on both axes. Orders row-major.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    #[inline]
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    pub fn to_a1(self) -> String {
        let mut out = col_to_name(self.col);
        out.push_str(&self.row.to_string());
        out
    }

    /// Parses `B7`, `$B$7` or `b7`. Absolute markers are accepted and
    /// discarded; see [`crate::AnchoredCell`] to keep them.
    pub fn from_a1(a1: &str) -> Result<Self, A1ParseError> {
        let text = a1.trim();
        if text.is_empty() {
            return Err(A1ParseError::Empty);
        }

        let rest = text.strip_prefix('$').unwrap_or(text);
        let letters_end = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        let (letters, rest) = rest.split_at(letters_end);
        if letters.is_empty() {
            return Err(A1ParseError::MissingColumn);
        }

        let rest = rest.strip_prefix('$').unwrap_or(rest);
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (digits, trailing) = rest.split_at(digits_end);
        if digits.is_empty() {
            return Err(A1ParseError::MissingRow);
        }
        if !trailing.is_empty() {
            return Err(A1ParseError::TrailingCharacters);
        }

        let col = name_to_col(letters)?;
        if col > EXCEL_MAX_COLS {
            return Err(A1ParseError::InvalidColumn);
        }
        match digits.parse::<u32>() {
            Ok(row) if (1..=EXCEL_MAX_ROWS).contains(&row) => Ok(Self { row, col }),
            _ => Err(A1ParseError::InvalidRow),
        }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", col_to_name(self.col), self.row)
    }
}

/// Inclusive rectangle; `start` is always the top-left corner.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Range {
    pub start: CellRef,
    pub end: CellRef,
}

const fn min_u32(a: u32, b: u32) -> u32 {
    if a < b {
        a
    } else {
        b
    }
}

const fn max_u32(a: u32, b: u32) -> u32 {
    if a > b {
        a
    } else {
        b
    }
}

impl Range {
    /// Any two opposite corners.
    pub const fn new(a: CellRef, b: CellRef) -> Self {
        Self {
            start: CellRef::new(min_u32(a.row, b.row), min_u32(a.col, b.col)),
            end: CellRef::new(max_u32(a.row, b.row), max_u32(a.col, b.col)),
        }
    }

    pub const fn from_bounds(start_row: u32, start_col: u32, end_row: u32, end_col: u32) -> Self {
        Self::new(
            CellRef::new(start_row, start_col),
            CellRef::new(end_row, end_col),
        )
    }

    #[inline]
    pub const fn contains(&self, cell: CellRef) -> bool {
        self.start.row <= cell.row
            && cell.row <= self.end.row
            && self.start.col <= cell.col
            && cell.col <= self.end.col
    }

    #[inline]
    pub const fn intersects(&self, other: &Range) -> bool {
        !(other.end.row < self.start.row
            || self.end.row < other.start.row
            || other.end.col < self.start.col
            || self.end.col < other.start.col)
    }

    pub fn intersection(&self, other: &Range) -> Option<Range> {
        self.intersects(other).then(|| {
            Range::from_bounds(
                self.start.row.max(other.start.row),
                self.start.col.max(other.start.col),
                self.end.row.min(other.end.row),
                self.end.col.min(other.end.col),
            )
        })
    }

    /// Bounding box of both.
    pub fn union(&self, other: &Range) -> Range {
        Range::new(
            CellRef::new(
                self.start.row.min(other.start.row),
                self.start.col.min(other.start.col),
            ),
            CellRef::new(
                self.end.row.max(other.end.row),
                self.end.col.max(other.end.col),
            ),
        )
    }

    #[inline]
    pub const fn width(&self) -> u32 {
        1 + self.end.col - self.start.col
    }

    #[inline]
    pub const fn height(&self) -> u32 {
        1 + self.end.row - self.start.row
    }

    #[inline]
    pub const fn is_single_cell(&self) -> bool {
        self.width() == 1 && self.height() == 1
    }

    /// `C3` parses as the one-cell range `C3:C3`.
    pub fn from_a1(a1: &str) -> Result<Self, RangeParseError> {
        let text = a1.trim();
        if text.is_empty() {
            return Err(RangeParseError::Empty);
        }
        let (first, second) = text.split_once(':').unwrap_or((text, text));
        Ok(Range::new(parse_corner(first)?, parse_corner(second)?))
    }
}

fn parse_corner(token: &str) -> Result<CellRef, RangeParseError> {
    CellRef::from_a1(token).map_err(|source| RangeParseError::Cell {
        token: token.to_string(),
        source,
    })
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start)?;
        if !self.is_single_cell() {
            write!(f, ":{}", self.end)?;
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum A1ParseError {
    #[error("empty cell reference")]
    Empty,
    #[error("cell reference has no column letters")]
    MissingColumn,
    #[error("cell reference has no row number")]
    MissingRow,
    #[error("column is outside A..XFD")]
    InvalidColumn,
    #[error("row is outside 1..1048576")]
    InvalidRow,
    #[error("unexpected text after the row number")]
    TrailingCharacters,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RangeParseError {
    #[error("empty range")]
    Empty,
    #[error("bad cell `{token}`: {source}")]
    Cell {
        token: String,
        #[source]
        source: A1ParseError,
    },
}

/// `1` → `A`, `28` → `AB`. Column `0` has no letters.
pub fn col_to_name(col: u32) -> String {
    let mut letters = Vec::new();
    let mut rest = col;
    while rest > 0 {
        rest -= 1;
        letters.push(char::from(b'A' + (rest % 26) as u8));
        rest /= 26;
    }
    letters.iter().rev().collect()
}

/// Bijective base-26, case-insensitive. Does not check the sheet limit.
pub fn name_to_col(letters: &str) -> Result<u32, A1ParseError> {
    if letters.is_empty() {
        return Err(A1ParseError::InvalidColumn);
    }
    letters.chars().try_fold(0u32, |acc, c| {
        if !c.is_ascii_alphabetic() {
            return Err(A1ParseError::InvalidColumn);
        }
        let digit = u32::from(c.to_ascii_uppercase()) - u32::from('A') + 1;
        acc.checked_mul(26)
            .and_then(|v| v.checked_add(digit))
            .ok_or(A1ParseError::InvalidColumn)
    })
}
