//! Read-only iteration over a rope's chunks.
//!
//! Iterators borrow the rope and become invalid the moment it's mutated
//! (the borrow checker enforces this: any `insert`/`remove` call requires
//! `&mut Rope`, which can't coexist with a live iterator borrow).

use crate::alloc::ChunkAllocator;
use crate::node::Node;
use crate::rope::Rope;

/// Walks every node reachable from the head's level-0 link, head included.
pub(crate) struct NodeIter<'a>(pub(crate) Option<&'a Node>);

impl<'a> Iterator for NodeIter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<&'a Node> {
        let prev = self.0;
        if let Some(n) = self.0 {
            self.0 = unsafe { n.first_next().node.as_ref() };
        }
        prev
    }
}

/// One chunk of a rope's content, as exposed by [`Rope::chunks`].
#[derive(Debug, Clone, Copy)]
pub struct Chunk<'a> {
    bytes: &'a [u8],
    num_chars: usize,
    #[cfg(feature = "wchar_conversion")]
    num_wchars: usize,
}

impl<'a> Chunk<'a> {
    /// This chunk's content as a UTF-8 byte slice.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// This chunk's content as a string slice.
    pub fn as_str(&self) -> &'a str {
        // Safety: every chunk's bytes were written from a validated &str.
        unsafe { std::str::from_utf8_unchecked(self.bytes) }
    }

    /// Number of Unicode scalar values in this chunk.
    pub fn char_count(&self) -> usize {
        self.num_chars
    }

    /// Number of UTF-16 code units this chunk would occupy.
    #[cfg(feature = "wchar_conversion")]
    pub fn wchar_count(&self) -> usize {
        self.num_wchars
    }
}

/// Iterator over a rope's non-empty chunks, in order.
pub struct ChunkIter<'a>(pub(crate) NodeIter<'a>);

impl<'a> Iterator for ChunkIter<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let n = self.0.next()?;
            if n.num_bytes == 0 {
                // The head carries no content; skip it (and any other
                // empty node, though only the head is ever legally empty).
                continue;
            }
            return Some(Chunk {
                bytes: n.content_slice(),
                num_chars: n.num_chars(),
                #[cfg(feature = "wchar_conversion")]
                num_wchars: n.first_next().skip_wchars,
            });
        }
    }
}

impl<A: ChunkAllocator> Rope<A> {
    /// An in-order iterator over the rope's content, one chunk at a time.
    /// Read-only; borrows `self` for the iterator's lifetime.
    pub fn chunks(&self) -> ChunkIter<'_> {
        ChunkIter(NodeIter(Some(self.head())))
    }
}
