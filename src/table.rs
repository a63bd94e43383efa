//! The canonical block store, indexed by both ends of every block.
use alloc::collections::BTreeMap;

use crate::{int::Offset, Block, Error};

/// Every block of an arena, reachable by start offset and by end offset.
///
/// `by_start` owns the block records. `by_end` maps `block.end()` to
/// `block.offset` and is kept in sync by [`Self::insert`] and
/// [`Self::remove`].
#[derive(Debug, Clone)]
pub(crate) struct BlockTable<O> {
    by_start: BTreeMap<O, Block<O>>,
    by_end: BTreeMap<O, O>,
}

impl<O: Offset> BlockTable<O> {
    pub fn new() -> Self {
        Self {
            by_start: BTreeMap::new(),
            by_end: BTreeMap::new(),
        }
    }

    /// Register `block`. Fails without modifying `self` if another block
    /// already starts or ends at the same offset.
    pub fn insert(&mut self, block: Block<O>) -> Result<(), Error<O>> {
        let end = block.end();
        if self.by_start.contains_key(&block.offset) || self.by_end.contains_key(&end) {
            log::error!("BlockTable::insert({:?}): slot already occupied", block);
            return Err(Error::InternalConsistency);
        }

        log::trace!("BlockTable::insert({:#x}..{:#x})", block.offset, end);
        self.by_start.insert(block.offset, block);
        self.by_end.insert(end, block.offset);
        Ok(())
    }

    /// Unregister `block`, which must match the stored record exactly.
    pub fn remove(&mut self, block: Block<O>) -> Result<(), Error<O>> {
        let end = block.end();
        if self.by_start.get(&block.offset) != Some(&block)
            || self.by_end.get(&end) != Some(&block.offset)
        {
            log::error!("BlockTable::remove({:?}): no such block", block);
            return Err(Error::InternalConsistency);
        }

        log::trace!("BlockTable::remove({:#x}..{:#x})", block.offset, end);
        self.by_start.remove(&block.offset);
        self.by_end.remove(&end);
        Ok(())
    }

    /// Find the block starting at `offset`.
    #[inline]
    pub fn find_by_start(&self, offset: O) -> Option<Block<O>> {
        self.by_start.get(&offset).copied()
    }

    /// Find the block ending at `offset`, i.e., the left neighbor of
    /// whatever starts at `offset`.
    #[inline]
    pub fn find_by_end(&self, offset: O) -> Option<Block<O>> {
        let start = self.by_end.get(&offset)?;
        self.by_start.get(start).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.by_start.len()
    }

    /// Iterate over all blocks in ascending offset order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = Block<O>> + '_ {
        self.by_start.values().copied()
    }

    /// Check that `by_end` is exactly the mirror image of `by_start`.
    pub fn is_mirrored(&self) -> bool {
        self.by_start.len() == self.by_end.len()
            && self
                .by_start
                .values()
                .all(|block| self.by_end.get(&block.end()) == Some(&block.offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_both_ends() {
        let mut table = BlockTable::<u32>::new();
        table.insert(Block::new_used(0, 10)).unwrap();
        table.insert(Block::new_free(10, 5)).unwrap();

        assert_eq!(table.find_by_start(10), Some(Block::new_free(10, 5)));
        assert_eq!(table.find_by_end(10), Some(Block::new_used(0, 10)));
        assert_eq!(table.find_by_end(15), Some(Block::new_free(10, 5)));
        assert_eq!(table.find_by_start(5), None);
        assert_eq!(table.find_by_end(5), None);
        assert!(table.is_mirrored());
    }

    #[test]
    fn insert_occupied_fails() {
        let mut table = BlockTable::<u32>::new();
        table.insert(Block::new_used(0, 10)).unwrap();

        // same start
        assert_eq!(
            table.insert(Block::new_free(0, 3)),
            Err(Error::InternalConsistency)
        );
        // same end
        assert_eq!(
            table.insert(Block::new_free(4, 6)),
            Err(Error::InternalConsistency)
        );
        assert_eq!(table.len(), 1);
        assert!(table.is_mirrored());
    }

    #[test]
    fn remove_mismatch_fails() {
        let mut table = BlockTable::<u32>::new();
        table.insert(Block::new_used(0, 10)).unwrap();

        assert_eq!(
            table.remove(Block::new_free(0, 10)),
            Err(Error::InternalConsistency)
        );
        assert_eq!(
            table.remove(Block::new_used(0, 9)),
            Err(Error::InternalConsistency)
        );
        table.remove(Block::new_used(0, 10)).unwrap();
        assert_eq!(table.len(), 0);
        assert_eq!(table.find_by_end(10), None);
    }
}
