use serde::{Deserialize, Serialize};

use crate::{CellRef, Range};

/// Errors raised when registering a merged region.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    #[error("merged region {0} must span more than one cell")]
    SingleCell(Range),
    #[error("merged region {new} overlaps existing region {existing}")]
    Overlap { new: Range, existing: Range },
}

/// The set of merged-cell regions of a worksheet.
///
/// Regions never overlap and always cover at least two cells.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MergedRegions {
    regions: Vec<Range>,
}

impl MergedRegions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, range: Range) -> Result<(), MergeError> {
        if range.is_single_cell() {
            return Err(MergeError::SingleCell(range));
        }
        if let Some(existing) = self.regions.iter().find(|r| r.intersects(&range)) {
            return Err(MergeError::Overlap {
                new: range,
                existing: *existing,
            });
        }
        self.regions.push(range);
        Ok(())
    }

    /// Remove every region intersecting `range`, returning how many were removed.
    pub fn remove_intersecting(&mut self, range: Range) -> usize {
        let before = self.regions.len();
        self.regions.retain(|r| !r.intersects(&range));
        before - self.regions.len()
    }

    /// The region containing `cell`, if any.
    pub fn region_at(&self, cell: CellRef) -> Option<Range> {
        self.regions.iter().copied().find(|r| r.contains(cell))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Range> {
        self.regions.iter()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Replace the region list wholesale.
    ///
    /// Used by structural rewrites that have already produced a consistent set.
    pub fn replace(&mut self, regions: Vec<Range>) {
        self.regions = regions;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_overlaps_and_single_cells() {
        let mut merges = MergedRegions::new();
        merges.add(Range::from_a1("G20:I22").unwrap()).unwrap();
        assert!(matches!(
            merges.add(Range::from_a1("I22:J23").unwrap()),
            Err(MergeError::Overlap { .. })
        ));
        assert!(matches!(
            merges.add(Range::from_a1("A1").unwrap()),
            Err(MergeError::SingleCell(_))
        ));
        assert_eq!(
            merges.region_at(CellRef::new(21, 8)),
            Some(Range::from_a1("G20:I22").unwrap())
        );
        assert_eq!(merges.remove_intersecting(Range::from_a1("H1:H100").unwrap()), 1);
        assert!(merges.is_empty());
    }
}
