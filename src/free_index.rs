//! Best-fit lookup over free blocks.
use alloc::collections::BTreeSet;

use crate::{int::Offset, Block, Error};

/// Free blocks ordered by `(size, offset)`.
///
/// The composite key makes "the smallest block that is large enough, lowest
/// offset first" a single range query.
#[derive(Debug, Clone)]
pub(crate) struct FreeIndex<O> {
    set: BTreeSet<(O, O)>,
    /// The sum of the sizes in `set`.
    total: O,
}

impl<O: Offset> FreeIndex<O> {
    pub fn new() -> Self {
        Self {
            set: BTreeSet::new(),
            total: O::ZERO,
        }
    }

    pub fn insert(&mut self, block: Block<O>) -> Result<(), Error<O>> {
        debug_assert!(block.free);
        if !block.free || !self.set.insert((block.size, block.offset)) {
            log::error!("FreeIndex::insert({:?}): rejected", block);
            return Err(Error::InternalConsistency);
        }
        self.total += block.size;
        Ok(())
    }

    pub fn remove(&mut self, block: Block<O>) -> Result<(), Error<O>> {
        debug_assert!(block.free);
        if !block.free || !self.set.remove(&(block.size, block.offset)) {
            log::error!("FreeIndex::remove({:?}): no such free block", block);
            return Err(Error::InternalConsistency);
        }
        self.total -= block.size;
        Ok(())
    }

    /// Find the smallest free block whose size is at least `size`, preferring
    /// the lowest offset among equally sized candidates.
    #[inline]
    pub fn best_fit(&self, size: O) -> Option<Block<O>> {
        // `(size, 0)` sorts before every `(size, offset)`, so an exact-size
        // block is always a candidate.
        self.set
            .range((size, O::ZERO)..)
            .next()
            .map(|&(size, offset)| Block::new_free(offset, size))
    }

    /// The largest free block. Ties go to the highest offset.
    #[inline]
    pub fn largest(&self) -> Option<Block<O>> {
        self.set
            .iter()
            .next_back()
            .map(|&(size, offset)| Block::new_free(offset, size))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.set.len()
    }

    /// The total size of all free blocks.
    #[inline]
    pub fn total_size(&self) -> O {
        self.total
    }

    #[inline]
    pub fn contains(&self, block: &Block<O>) -> bool {
        block.free && self.set.contains(&(block.size, block.offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(blocks: &[(u32, u32)]) -> FreeIndex<u32> {
        let mut index = FreeIndex::new();
        for &(offset, size) in blocks {
            index.insert(Block::new_free(offset, size)).unwrap();
        }
        index
    }

    #[test]
    fn exact_size_wins() {
        let index = index(&[(0, 100), (300, 5), (200, 6)]);
        assert_eq!(index.best_fit(5), Some(Block::new_free(300, 5)));
    }

    #[test]
    fn exact_size_at_max_offset() {
        let mut index = FreeIndex::<u8>::new();
        index.insert(Block::new_free(255, 1)).unwrap();
        index.insert(Block::new_free(0, 2)).unwrap();
        assert_eq!(index.best_fit(1), Some(Block::new_free(255, 1)));
    }

    #[test]
    fn smallest_sufficient_then_lowest_offset() {
        let index = index(&[(500, 8), (100, 8), (0, 50), (900, 7)]);
        assert_eq!(index.best_fit(8), Some(Block::new_free(100, 8)));
        assert_eq!(index.best_fit(1), Some(Block::new_free(900, 7)));
        assert_eq!(index.best_fit(9), Some(Block::new_free(0, 50)));
        assert_eq!(index.best_fit(51), None);
        assert_eq!(index.largest(), Some(Block::new_free(0, 50)));
        assert_eq!(index.total_size(), 73);
    }

    #[test]
    fn duplicate_and_missing() {
        let mut index = index(&[(0, 10)]);
        assert_eq!(
            index.insert(Block::new_free(0, 10)),
            Err(Error::InternalConsistency)
        );
        assert_eq!(
            index.remove(Block::new_free(10, 10)),
            Err(Error::InternalConsistency)
        );
        // Rejected calls leave the running total alone
        assert_eq!(index.total_size(), 10);
        index.remove(Block::new_free(0, 10)).unwrap();
        assert_eq!(index.len(), 0);
        assert_eq!(index.total_size(), 0);
        assert_eq!(index.best_fit(1), None);
    }
}
