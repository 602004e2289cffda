//! An indexed rope (fancy string) for text editors, built on a skip list of
//! UTF-8 chunks.
//!
//! A [`Rope`] supports inserting and removing text at a character position
//! in time logarithmic in the rope's length, without the O(n) shifting a
//! flat `String` would need. Internally it's a
//! [skip list](https://en.wikipedia.org/wiki/Skip_list) of small fixed-
//! capacity chunks: each forward link additionally tracks how many
//! characters (and, with the `wchar_conversion` feature, UTF-16 code units)
//! it skips over, so walking down from the tallest level locates any
//! position without visiting every chunk in between.
//!
//! ```
//! use skiprope::Rope;
//!
//! let mut rope = Rope::new();
//! rope.insert(0, "hello world");
//! rope.remove(5..11);
//! rope.insert(5, " there");
//! assert_eq!(rope.to_string(), "hello there");
//! ```
//!
//! This implementation does not validate any input beyond what Rust's type
//! system already guarantees (a `&str` is always valid UTF-8); [`try_insert`]
//! and [`TryFrom<&[u8]>`] exist for callers who start from raw bytes.
//!
//! [`try_insert`]: Rope::try_insert

mod alloc;
mod check;
mod codec;
mod cursor;
mod error;
mod iter;
mod node;
mod rope;

pub use crate::alloc::{ChunkAllocator, GlobalAllocator};
pub use crate::error::RopeError;
pub use crate::iter::{Chunk, ChunkIter};
pub use crate::rope::Rope;
