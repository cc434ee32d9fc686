use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{CellRef, Range, RangeParseError};

/// One or more rectangles addressed as a single unit.
///
/// This is the model of a SpreadsheetML `sqref` attribute: rectangles are
/// separated by whitespace (`A1 C3:D9`). Order is preserved as written so an
/// untouched set formats back to the same text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RangeSet {
    ranges: Vec<Range>,
}

impl RangeSet {
    pub fn new(ranges: Vec<Range>) -> Self {
        Self { ranges }
    }

    pub fn single(range: Range) -> Self {
        Self {
            ranges: vec![range],
        }
    }

    /// Parse a whitespace-separated list of A1 ranges.
    ///
    /// An empty string is rejected: a range set always addresses at least one cell.
    pub fn parse(text: &str) -> Result<Self, RangeParseError> {
        let mut ranges = Vec::new();
        for token in text.split_whitespace() {
            ranges.push(Range::from_a1(token)?);
        }
        if ranges.is_empty() {
            return Err(RangeParseError::Empty);
        }
        Ok(Self { ranges })
    }

    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    pub fn into_ranges(self) -> Vec<Range> {
        self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn contains(&self, cell: CellRef) -> bool {
        self.ranges.iter().any(|r| r.contains(cell))
    }

    /// Bounding box of every rectangle in the set.
    pub fn bounds(&self) -> Option<Range> {
        let mut iter = self.ranges.iter();
        let first = *iter.next()?;
        Some(iter.fold(first, |acc, r| acc.union(r)))
    }

    /// Canonical text form: uppercase column letters, no `$`, single cells without `:`.
    pub fn format(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, range) in self.ranges.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{range}")?;
        }
        Ok(())
    }
}

impl FromStr for RangeSet {
    type Err = RangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Range> for RangeSet {
    fn from(value: Range) -> Self {
        Self::single(value)
    }
}

impl FromIterator<Range> for RangeSet {
    fn from_iter<T: IntoIterator<Item = Range>>(iter: T) -> Self {
        Self {
            ranges: iter.into_iter().collect(),
        }
    }
}

/// Parse a SpreadsheetML `sqref` attribute (`A1`, `A1:B2`, `A1 A3:B7`).
pub fn parse_sqref(sqref: &str) -> Result<RangeSet, RangeParseError> {
    RangeSet::parse(sqref)
}

/// Format ranges as a SpreadsheetML `sqref` attribute.
pub fn format_sqref(ranges: &RangeSet) -> String {
    ranges.format()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_union_and_formats_canonically() {
        let set = RangeSet::parse("  $bi2:bi100   A1 c3:D4 ").unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.format(), "BI2:BI100 A1 C3:D4");
        assert_eq!(set.bounds(), Some(Range::from_a1("A1:BI100").unwrap()));
    }

    #[test]
    fn normalizes_leading_zero_rows() {
        let set = RangeSet::parse("A01:B002").unwrap();
        assert_eq!(set.format(), "A1:B2");
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(matches!(
            RangeSet::parse("A1 1A:B2"),
            Err(RangeParseError::Cell { .. })
        ));
        assert_eq!(RangeSet::parse("   "), Err(RangeParseError::Empty));
        assert!(RangeSet::parse("A1:").is_err());
    }
}
