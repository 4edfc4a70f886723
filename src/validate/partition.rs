use std::ops::Range;

#[cfg(feature = "with-serde")]
use serde::Serialize;

use super::OptionsError;

/// Number of parts assumed when only the part index is given.
pub const DEFAULT_TOTAL_PARTS: usize = 4;

/// One slice of a candidate list split into `total` contiguous parts.
///
/// Parts are balanced: with `n` items the first `n % total` parts hold
/// `n / total + 1` items and the others `n / total`. Independent runs can
/// each take one part without any coordination.
#[cfg_attr(feature = "with-serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    index: usize,
    total: usize,
}

impl Partition {
    /// `index` is 1-based and must not exceed `total`.
    pub fn new(index: usize, total: usize) -> Result<Self, OptionsError> {
        if total == 0 || index == 0 || index > total {
            return Err(OptionsError::InvalidPartition { index, total });
        }
        Ok(Self { index, total })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Index range of this part within a list of `len` items.
    pub fn bounds(&self, len: usize) -> Range<usize> {
        let base = len / self.total;
        let extra = len % self.total;
        let slot = self.index - 1;
        let start = slot * base + slot.min(extra);
        let size = base + usize::from(slot < extra);
        start..start + size
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.bounds(items.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn second_quarter_of_forty() {
        let items: Vec<usize> = (1..=40).collect();
        let part = Partition::new(2, 4).unwrap();
        assert_eq!(part.slice(&items), (11..=20).collect::<Vec<_>>().as_slice());
    }

    #[test]
    fn remainder_goes_to_leading_parts() {
        let sizes: Vec<usize> = (1..=4)
            .map(|index| Partition::new(index, 4).unwrap().bounds(10).len())
            .collect();
        assert_eq!(sizes, [3, 3, 2, 2]);
    }

    #[test]
    fn more_parts_than_items_leaves_trailing_parts_empty() {
        let part = Partition::new(3, 3).unwrap();
        assert!(part.slice(&["a", "b"]).is_empty());
    }

    #[test]
    fn rejects_out_of_range_index() {
        assert!(matches!(
            Partition::new(0, 4),
            Err(OptionsError::InvalidPartition { index: 0, total: 4 })
        ));
        assert!(Partition::new(5, 4).is_err());
        assert!(Partition::new(1, 0).is_err());
    }

    proptest! {
        #[test]
        fn parts_are_disjoint_and_cover_everything(len in 0usize..200, total in 1usize..50) {
            let items: Vec<usize> = (0..len).collect();
            let mut joined = Vec::with_capacity(len);
            let mut previous_end = 0;
            for index in 1..=total {
                let part = Partition::new(index, total).unwrap();
                let bounds = part.bounds(len);
                prop_assert_eq!(bounds.start, previous_end);
                previous_end = bounds.end;
                joined.extend_from_slice(part.slice(&items));
            }
            prop_assert_eq!(joined, items);
        }

        #[test]
        fn part_sizes_differ_by_at_most_one(len in 0usize..200, total in 1usize..50) {
            let sizes: Vec<usize> = (1..=total)
                .map(|index| Partition::new(index, total).unwrap().bounds(len).len())
                .collect();
            let min = sizes.iter().copied().min().unwrap_or(0);
            let max = sizes.iter().copied().max().unwrap_or(0);
            prop_assert!(max - min <= 1);
        }
    }
}
