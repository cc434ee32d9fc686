use core::fmt;

use crate::{col_to_name, CellRef, Range, RangeParseError};

/// A cell reference that remembers its `$` anchors (`$B$2`, `B$2`, ...).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AnchoredCell {
    pub cell: CellRef,
    pub col_abs: bool,
    pub row_abs: bool,
}

impl AnchoredCell {
    pub fn parse(token: &str) -> Result<Self, RangeParseError> {
        let token = token.trim();
        let cell = CellRef::from_a1(token).map_err(|source| RangeParseError::Cell {
            token: token.to_string(),
            source,
        })?;
        let col_abs = token.starts_with('$');
        let row_abs = token
            .trim_start_matches('$')
            .trim_start_matches(|c: char| c.is_ascii_alphabetic())
            .starts_with('$');
        Ok(Self {
            cell,
            col_abs,
            row_abs,
        })
    }
}

impl fmt::Display for AnchoredCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let col = if self.col_abs { "$" } else { "" };
        let row = if self.row_abs { "$" } else { "" };
        write!(
            f,
            "{col}{}{row}{}",
            col_to_name(self.cell.col),
            self.cell.row
        )
    }
}

/// An A1 area (`A1` or `A1:B2`) with anchors preserved.
///
/// Shifting replaces the coordinates and keeps each corner's anchors, so
/// `$A$1:$B$9` stays absolute after a splice.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AnchoredRange {
    pub start: AnchoredCell,
    pub end: AnchoredCell,
    /// Written as a single cell (no `:`).
    pub single: bool,
}

impl AnchoredRange {
    pub fn parse(text: &str) -> Result<Self, RangeParseError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(RangeParseError::Empty);
        }
        match text.split_once(':') {
            None => {
                let cell = AnchoredCell::parse(text)?;
                Ok(Self {
                    start: cell,
                    end: cell,
                    single: true,
                })
            }
            Some((a, b)) => {
                let mut start = AnchoredCell::parse(a)?;
                let mut end = AnchoredCell::parse(b)?;
                // Normalize reversed corners (`B2:A1`) coordinate-wise.
                if start.cell.row > end.cell.row {
                    std::mem::swap(&mut start.cell.row, &mut end.cell.row);
                    std::mem::swap(&mut start.row_abs, &mut end.row_abs);
                }
                if start.cell.col > end.cell.col {
                    std::mem::swap(&mut start.cell.col, &mut end.cell.col);
                    std::mem::swap(&mut start.col_abs, &mut end.col_abs);
                }
                Ok(Self {
                    start,
                    end,
                    single: false,
                })
            }
        }
    }

    pub fn range(&self) -> Range {
        Range::new(self.start.cell, self.end.cell)
    }

    /// The same anchors applied to a new rectangle.
    pub fn with_range(mut self, range: Range) -> Self {
        self.start.cell = range.start;
        self.end.cell = range.end;
        self.single = self.single && range.is_single_cell();
        self
    }
}

impl fmt::Display for AnchoredRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.single || self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchors_survive_reformatting() {
        for text in ["$A$1", "B$2", "$C3", "$A$1:$BI$100", "a1:b2"] {
            let parsed = AnchoredRange::parse(text).unwrap();
            assert_eq!(parsed.to_string(), text.to_ascii_uppercase());
        }
    }

    #[test]
    fn with_range_keeps_anchors() {
        let parsed = AnchoredRange::parse("$B$2:C$9").unwrap();
        let moved = parsed.with_range(Range::from_a1("A2:B9").unwrap());
        assert_eq!(moved.to_string(), "$A$2:B$9");
    }

    #[test]
    fn reversed_corners_are_normalized() {
        let parsed = AnchoredRange::parse("C3:$A$1").unwrap();
        assert_eq!(parsed.to_string(), "$A$1:C3");
    }
}
