//! The best-fit allocator core
use core::fmt;

use crate::{free_index::FreeIndex, int::Offset, table::BlockTable, Block, Error};

/// A best-fit allocator handing out extents of a fixed arena `0..capacity`.
///
/// # Data Structure Overview
///
#[doc = svgbobdoc::transform!(
/// <center>
///
/// ```svgbob
///   Arena (capacity = 1000)
///
///    0        200      260               700            1000
///    ,--------+--------+-----------------+---------------,
///    |  used  |  free  |      used       |     free      |
///    '--------+---+----+-----------------+-------+-------'
///                 |                              |
/// ╶╶╶╶╶╶╶╶╶╶╶╶╶╶╶╶|╶╶╶╶╶╶╶╶╶╶╶╶╶╶╶╶╶╶╶╶╶╶╶╶╶╶╶╶╶╶|╶╶╶╶╶╶╶╶╶╶╶╶╶╶╶
///   Free index    |   (size, offset)             |
///                 v                              v
///            ,----------,                 ,-----------,
///            | (60,200) |---------------->| (300,700) |
///            '----------'                 '-----------'
///              best_fit(50) lands here first
/// ```
///
/// </center>
)]
///
/// Every block is recorded in a table keyed by its start offset and by its
/// end offset, so both neighbors of a block are found in logarithmic time.
/// Free blocks are additionally kept in an index ordered by
/// `(size, offset)`.
///
/// # Properties
///
///  - The blocks always partition `0..capacity` exactly.
///  - No two free blocks are adjacent; [`Self::release`] coalesces with both
///    neighbors immediately.
///  - [`Self::acquire`] picks the smallest sufficient free block, lowest
///    offset first, and splits off the unused tail as a new free block.
///
/// # Examples
///
/// ```rust
/// use bestfit::{Allocator, Error};
///
/// let mut arena: Allocator<u32> = Allocator::new(1000).unwrap();
/// let a = arena.acquire(200).unwrap();
/// let b = arena.acquire(500).unwrap();
/// assert_eq!((a, b), (0, 200));
/// assert_eq!(arena.acquire(301), Err(Error::OutOfMemory { requested: 301 }));
///
/// arena.release(a).unwrap();
/// arena.release(b).unwrap();
/// assert_eq!(arena.available(), 1000);
/// ```
#[derive(Clone)]
pub struct Allocator<O = usize> {
    capacity: O,
    /// The sum of the sizes of all allocated blocks.
    used: O,
    table: BlockTable<O>,
    free: FreeIndex<O>,
}

/// A snapshot of an [`Allocator`]'s occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats<O = usize> {
    pub capacity: O,
    pub used: O,
    pub available: O,
    /// The total number of blocks, free or not.
    pub blocks: usize,
    pub free_blocks: usize,
    /// The size of the largest free block. `None` if the arena is full.
    pub largest_free: Option<O>,
}

impl<O: Offset> Allocator<O> {
    /// Construct an allocator managing `0..capacity`, initially one free
    /// block spanning the whole arena.
    pub fn new(capacity: O) -> Result<Self, Error<O>> {
        log::debug!("Allocator::new({})", capacity);
        if capacity == O::ZERO {
            return Err(Error::ZeroCapacity);
        }

        let mut this = Self {
            capacity,
            used: O::ZERO,
            table: BlockTable::new(),
            free: FreeIndex::new(),
        };
        this.link(Block::new_free(O::ZERO, capacity))?;
        Ok(this)
    }

    /// Allocate a block of `size` units and return its offset.
    ///
    /// # Errors
    ///
    ///  - [`Error::ZeroSize`] if `size` is zero.
    ///  - [`Error::OutOfMemory`] if no free block is large enough.
    ///
    /// # Time Complexity
    ///
    /// `O(log n)` where `n` is the number of blocks. Debug builds also run
    /// [`Self::check_integrity`] afterwards, which makes it `O(n log n)`.
    pub fn acquire(&mut self, size: O) -> Result<O, Error<O>> {
        log::trace!("Allocator::acquire({})", size);
        if size == O::ZERO {
            return Err(Error::ZeroSize);
        }

        let found = self.free.best_fit(size).ok_or_else(|| {
            log::debug!("Allocator::acquire({}): out of memory", size);
            Error::OutOfMemory { requested: size }
        })?;
        debug_assert!(found.size >= size);

        self.unlink(found)?;
        self.link(Block::new_used(found.offset, size))?;
        if found.size > size {
            // Put the tail back as a free block
            self.link(Block::new_free(found.offset + size, found.size - size))?;
        }
        self.used += size;

        self.debug_check_integrity();
        log::debug!("Allocator::acquire({}) -> {:#x}", size, found.offset);
        Ok(found.offset)
    }

    /// Release the allocated block starting at `offset`, merging it with
    /// adjacent free blocks.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidFree`] if `offset` is not the start of a currently
    /// allocated block. The allocator is left unchanged in that case.
    ///
    /// # Time Complexity
    ///
    /// `O(log n)` where `n` is the number of blocks. Debug builds also run
    /// [`Self::check_integrity`] afterwards, which makes it `O(n log n)`.
    pub fn release(&mut self, offset: O) -> Result<(), Error<O>> {
        log::trace!("Allocator::release({:#x})", offset);
        let block = match self.table.find_by_start(offset) {
            Some(block) if !block.free => block,
            _ => {
                log::debug!("Allocator::release({:#x}): not allocated", offset);
                return Err(Error::InvalidFree { offset });
            }
        };

        self.unlink(block)?;
        let block = Block::new_free(block.offset, block.size);
        self.link(block)?;
        self.used -= block.size;

        let block = self.maybe_merge_left(block)?;
        let block = self.maybe_merge_right(block)?;

        self.debug_check_integrity();
        log::debug!(
            "Allocator::release({:#x}): free block is now {:#x}..{:#x}",
            offset,
            block.offset,
            block.end()
        );
        Ok(())
    }

    /// Register `block` in the table and, if it's free, in the free index.
    fn link(&mut self, block: Block<O>) -> Result<(), Error<O>> {
        self.table.insert(block)?;
        if block.free {
            self.free.insert(block)?;
        }
        Ok(())
    }

    /// Undo [`Self::link`].
    fn unlink(&mut self, block: Block<O>) -> Result<(), Error<O>> {
        self.table.remove(block)?;
        if block.free {
            self.free.remove(block)?;
        }
        Ok(())
    }

    /// Replace two adjacent free blocks with one spanning both.
    fn merge(&mut self, left: Block<O>, right: Block<O>) -> Result<Block<O>, Error<O>> {
        debug_assert!(left.free && right.free);
        debug_assert_eq!(left.end(), right.offset);
        log::trace!(
            "merging blocks {:#x}..{:#x}, {:#x}..{:#x}",
            left.offset,
            left.end(),
            right.offset,
            right.end()
        );

        // Remove both first so that the merged block never overlaps a stale
        // entry
        self.unlink(left)?;
        self.unlink(right)?;
        let merged = Block::new_free(left.offset, left.size + right.size);
        self.link(merged)?;
        Ok(merged)
    }

    fn maybe_merge_left(&mut self, block: Block<O>) -> Result<Block<O>, Error<O>> {
        match self.table.find_by_end(block.offset) {
            Some(left) if left.free => self.merge(left, block),
            _ => Ok(block),
        }
    }

    fn maybe_merge_right(&mut self, block: Block<O>) -> Result<Block<O>, Error<O>> {
        match self.table.find_by_start(block.end()) {
            Some(right) if right.free => self.merge(block, right),
            _ => Ok(block),
        }
    }

    /// The size of the arena.
    #[inline]
    pub fn capacity(&self) -> O {
        self.capacity
    }

    /// The total size of all allocated blocks.
    #[inline]
    pub fn used(&self) -> O {
        self.used
    }

    /// The total size of all free blocks.
    #[inline]
    pub fn available(&self) -> O {
        self.capacity - self.used
    }

    /// The size of the largest free block, which is also the largest
    /// request [`Self::acquire`] would currently accept.
    #[inline]
    pub fn largest_free(&self) -> Option<O> {
        self.free.largest().map(|block| block.size)
    }

    /// The number of free blocks. Each one is a maximal free extent.
    #[inline]
    pub fn free_blocks(&self) -> usize {
        self.free.len()
    }

    /// Get the block starting at `offset`, free or not.
    #[inline]
    pub fn block(&self, offset: O) -> Option<Block<O>> {
        self.table.find_by_start(offset)
    }

    /// Iterate over all blocks in ascending offset order.
    #[inline]
    pub fn blocks(&self) -> impl Iterator<Item = Block<O>> + '_ {
        self.table.iter()
    }

    pub fn stats(&self) -> Stats<O> {
        Stats {
            capacity: self.capacity,
            used: self.used,
            available: self.available(),
            blocks: self.table.len(),
            free_blocks: self.free_blocks(),
            largest_free: self.largest_free(),
        }
    }

    /// Verify every invariant of the block indices.
    ///
    ///  1. The blocks are non-empty and tile `0..capacity` without gaps or
    ///     overlaps.
    ///  2. No two free blocks are adjacent.
    ///  3. The free index holds exactly the free blocks.
    ///  4. The end-offset index mirrors the start-offset index.
    ///  5. The used-size counter matches the allocated blocks, and the free
    ///     index's running total matches [`Self::available`].
    ///
    /// # Time Complexity
    ///
    /// `O(n log n)` where `n` is the number of blocks.
    pub fn check_integrity(&self) -> Result<(), Error<O>> {
        let mut expected_offset = O::ZERO;
        let mut prev_free = false;
        let mut used = O::ZERO;
        let mut free_blocks = 0;

        for block in self.table.iter() {
            // (1)
            if block.offset != expected_offset || block.size == O::ZERO {
                log::error!("{:?} does not start at {:#x}", block, expected_offset);
                return Err(Error::InternalConsistency);
            }

            if block.free {
                // (2)
                if prev_free {
                    log::error!("{:?} follows another free block", block);
                    return Err(Error::InternalConsistency);
                }
                // (3)
                if !self.free.contains(&block) {
                    log::error!("{:?} is missing from the free index", block);
                    return Err(Error::InternalConsistency);
                }
                free_blocks += 1;
            } else {
                used = used
                    .checked_add(block.size)
                    .ok_or(Error::InternalConsistency)?;
            }

            prev_free = block.free;
            expected_offset = block.checked_end().ok_or(Error::InternalConsistency)?;
        }

        let consistent = expected_offset == self.capacity // (1)
            && free_blocks == self.free.len() // (3)
            && self.table.is_mirrored() // (4)
            && used == self.used // (5)
            && self.free.total_size() == self.available(); // (5)
        if !consistent {
            log::error!("block indices are out of sync: {:?}", self);
            return Err(Error::InternalConsistency);
        }
        Ok(())
    }

    #[inline]
    fn debug_check_integrity(&self) {
        debug_assert_eq!(self.check_integrity(), Ok(()));
    }
}

impl<O: Offset> fmt::Debug for Allocator<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct BlockList<'a, O>(&'a BlockTable<O>);

        impl<O: Offset> fmt::Debug for BlockList<'_, O> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_list()
                    .entries(self.0.iter().map(|block| {
                        let tag = if block.free { "free" } else { "used" };
                        (block.offset..block.end(), tag)
                    }))
                    .finish()
            }
        }

        f.debug_struct("Allocator")
            .field("capacity", &self.capacity)
            .field("used", &self.used)
            .field("blocks", &BlockList(&self.table))
            .finish()
    }
}
