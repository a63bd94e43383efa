use core::fmt;

/// The error type returned by [`Allocator`](crate::Allocator) operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error<O> {
    /// No free block is large enough to hold `requested` units.
    ///
    /// This is recoverable; releasing blocks may make the request succeed.
    OutOfMemory { requested: O },
    /// `offset` is not the start of a currently allocated block. This covers
    /// unknown offsets, offsets inside a block, and double frees.
    InvalidFree { offset: O },
    /// A zero-sized block was requested.
    ZeroSize,
    /// An arena of capacity zero was requested.
    ZeroCapacity,
    /// The block indices disagree with each other. Never returned unless
    /// there's a bug in this crate.
    InternalConsistency,
}

impl<O: fmt::Display> fmt::Display for Error<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory { requested } => {
                write!(f, "no free block can hold {} units", requested)
            }
            Self::InvalidFree { offset } => {
                write!(f, "offset {} is not the start of an allocated block", offset)
            }
            Self::ZeroSize => f.write_str("requested block size is zero"),
            Self::ZeroCapacity => f.write_str("arena capacity is zero"),
            Self::InternalConsistency => f.write_str("block indices are out of sync"),
        }
    }
}

#[cfg(feature = "std")]
#[cfg_attr(feature = "doc_cfg", doc(cfg(feature = "std")))]
impl<O: fmt::Debug + fmt::Display> std::error::Error for Error<O> {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::ToString;

    #[test]
    fn display() {
        assert_eq!(
            Error::OutOfMemory { requested: 1001u32 }.to_string(),
            "no free block can hold 1001 units"
        );
        assert_eq!(
            Error::InvalidFree { offset: 7u32 }.to_string(),
            "offset 7 is not the start of an allocated block"
        );
        assert_eq!(Error::<u32>::ZeroSize.to_string(), "requested block size is zero");
    }
}
