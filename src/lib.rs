//! This crate implements an offset-addressed best-fit allocator over a fixed
//! arena.
//!
//!  - **The arena is just a range of integers.** [`Allocator`] hands out
//!    offsets into `0..capacity` and never touches memory. The caller maps
//!    offsets onto whatever storage it manages: a byte buffer, regions of a
//!    file, slots of a simulation.
//!
//!  - **Best fit, lowest offset first.** Each request is served from the
//!    smallest free block that can hold it. Among equally sized candidates
//!    the one with the lowest offset wins, which keeps free space compact
//!    toward the start of the arena.
//!
//!  - **Eager coalescing.** Releasing a block immediately merges it with free
//!    neighbors on both sides, so the arena never holds two adjacent free
//!    blocks.
//!
//!  - **Logarithmic time.** Both operations complete in `O(log n)` where `n`
//!    is the number of blocks. Debug builds re-verify every index after each
//!    operation, which costs `O(n log n)`.
//!
//!  - **This crate supports `#![no_std]`.** It needs `alloc` for its
//!    ordered maps.
//!
//! # Examples
//!
//! ```rust
//! use bestfit::{Allocator, Block, Error};
//!
//! let mut arena: Allocator = Allocator::new(1000).unwrap();
//!
//! let offsets: Vec<usize> = (0..100).map(|_| arena.acquire(5).unwrap()).collect();
//! assert_eq!(offsets[..3], [0, 5, 10]);
//!
//! for &offset in &offsets {
//!     arena.release(offset).unwrap();
//! }
//! assert_eq!(arena.release(offsets[0]), Err(Error::InvalidFree { offset: 0 }));
//!
//! // Everything has been merged back into a single free block
//! let blocks: Vec<Block> = arena.blocks().collect();
//! assert_eq!(blocks, [Block { offset: 0, size: 1000, free: true }]);
//! ```
//!
//! # Cargo Features
//!
//!  - `std` implements `std::error::Error` for [`Error`].
//!  - `doc_cfg` renders the diagrams in this documentation (requires a
//!    nightly compiler).
//!
#![no_std]
#![cfg_attr(feature = "doc_cfg", feature(doc_cfg))]

extern crate alloc;

mod allocator;
mod block;
mod error;
mod free_index;
pub mod int;
mod table;
pub use self::{
    allocator::{Allocator, Stats},
    block::Block,
    error::Error,
    int::Offset,
};

#[cfg(any(test, feature = "std"))]
extern crate std;
