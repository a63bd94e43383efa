use crate::int::Offset;

/// One contiguous extent of the arena, either free or allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Block<O = usize> {
    /// The first unit covered by the block.
    pub offset: O,
    /// The number of units covered by the block. Never zero.
    pub size: O,
    pub free: bool,
}

impl<O: Offset> Block<O> {
    #[inline]
    pub(crate) const fn new_free(offset: O, size: O) -> Self {
        Self {
            offset,
            size,
            free: true,
        }
    }

    #[inline]
    pub(crate) const fn new_used(offset: O, size: O) -> Self {
        Self {
            offset,
            size,
            free: false,
        }
    }

    /// The one-past-end offset of the block.
    ///
    /// Blocks handed out by an [`Allocator`](crate::Allocator) lie within the
    /// arena, so this never overflows for them.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `offset + size` overflows `O`. Use
    /// [`Self::checked_end`] for blocks built by hand.
    #[inline]
    pub fn end(&self) -> O {
        self.offset + self.size
    }

    /// The one-past-end offset of the block, or `None` if it overflows `O`.
    #[inline]
    pub fn checked_end(&self) -> Option<O> {
        self.offset.checked_add(self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_at_type_max() {
        let block = Block::new_used(u8::MAX - 1, 1u8);
        assert_eq!(block.end(), u8::MAX);
        assert_eq!(block.checked_end(), Some(u8::MAX));
    }

    #[test]
    fn checked_end_overflow() {
        let block = Block {
            offset: u8::MAX,
            size: 1u8,
            free: false,
        };
        assert_eq!(block.checked_end(), None);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic]
    fn end_overflow_panics() {
        let block = Block {
            offset: u8::MAX,
            size: 1u8,
            free: true,
        };
        let _ = block.end();
    }
}
