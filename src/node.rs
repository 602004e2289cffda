//! The chunk node: a fixed-capacity UTF-8 buffer plus a variable-length
//! array of forward links.
//!
//! A node's in-memory size depends on its `height`: the struct is declared
//! with a zero-length trailing array and allocated with room for exactly
//! `height` [`SkipEntry`] slots, the same flexible-array-member trick the
//! original C `rope_node_t` uses and that `jumprope`'s Rust port carries
//! over via `#[repr(C)]` + `[SkipEntry; 0]`.

use std::alloc::Layout;
use std::{mem, ptr, str};

use crate::alloc::ChunkAllocator;

/// Chunk capacity in bytes. Must be <= `u8::MAX` since [`Node::num_bytes`]
/// is a `u8`.
pub const NODE_STR_SIZE: usize = 128;

/// Maximum node height. One slot is always reserved purely for the head
/// sentinel, so the tallest a non-head node can get is `MAX_HEIGHT - 1`.
pub const MAX_HEIGHT: usize = 60;

/// Out of 256, the chance a node gets height `(n+1)` instead of `n`,
/// expressed as a byte-comparison threshold so
/// `random_level`/`rng.gen::<u8>() < BIAS` needs no scaling.
pub const BIAS: u8 = 64; // 64 / 256 = 25%

/// A forward link: how far (in characters, and optionally UTF-16 code
/// units) the skip list jumps at this level, and which node it lands on.
#[derive(Copy, Clone, Debug)]
pub(crate) struct SkipEntry {
    pub node: *mut Node,
    pub skip_chars: usize,
    #[cfg(feature = "wchar_conversion")]
    pub skip_wchars: usize,
}

impl SkipEntry {
    pub fn new() -> Self {
        SkipEntry {
            node: ptr::null_mut(),
            skip_chars: 0,
            #[cfg(feature = "wchar_conversion")]
            skip_wchars: 0,
        }
    }
}

#[repr(C)]
pub(crate) struct Node {
    /// A prefix of the rope's UTF-8 encoding; always a whole number of
    /// scalar values. Only `str[..num_bytes]` is meaningful.
    pub str: [u8; NODE_STR_SIZE],
    /// Bytes of `str` in use.
    pub num_bytes: u8,
    /// Number of live entries in `nexts`.
    pub height: u8,
    // Actually `height` entries live here; see `alloc_with_height`.
    nexts: [SkipEntry; 0],
}

impl Node {
    fn layout_with_height(height: u8) -> Layout {
        Layout::from_size_align(
            mem::size_of::<Node>() + mem::size_of::<SkipEntry>() * height as usize,
            mem::align_of::<Node>(),
        )
        .unwrap()
    }

    /// Allocate (via `alloc`) and initialize an empty node of the given
    /// height. The node owns no bytes yet; every link points nowhere with a
    /// zero span.
    pub unsafe fn alloc_with_height<A: ChunkAllocator>(height: u8, alloc: &A) -> *mut Node {
        assert!(height >= 1 && height as usize <= MAX_HEIGHT);

        let layout = Self::layout_with_height(height);
        let raw = alloc.alloc(layout);
        if raw.is_null() {
            std::alloc::handle_alloc_error(layout);
        }
        let node = raw as *mut Node;
        ptr::write(
            node,
            Node {
                str: [0; NODE_STR_SIZE],
                num_bytes: 0,
                height,
                nexts: [],
            },
        );

        for next in (*node).nexts_mut() {
            *next = SkipEntry::new();
        }

        node
    }

    pub unsafe fn free<A: ChunkAllocator>(p: *mut Node, alloc: &A) {
        let height = (*p).height;
        alloc.dealloc(p as *mut u8, Self::layout_with_height(height));
    }

    pub fn nexts(&self) -> &[SkipEntry] {
        unsafe { std::slice::from_raw_parts(self.nexts.as_ptr(), self.height as usize) }
    }

    pub fn nexts_mut(&mut self) -> &mut [SkipEntry] {
        unsafe { std::slice::from_raw_parts_mut(self.nexts.as_mut_ptr(), self.height as usize) }
    }

    pub fn content_slice(&self) -> &[u8] {
        &self.str[..self.num_bytes as usize]
    }

    pub fn as_str(&self) -> &str {
        if cfg!(debug_assertions) {
            str::from_utf8(self.content_slice()).unwrap()
        } else {
            // Safety: every byte ever written into `str` came from a `&str`,
            // and splits always land on scalar-value boundaries.
            unsafe { str::from_utf8_unchecked(self.content_slice()) }
        }
    }

    /// Height is always >= 1, so there is always a first link.
    pub fn first_next(&self) -> &SkipEntry {
        &self.nexts()[0]
    }

    pub fn first_next_mut(&mut self) -> &mut SkipEntry {
        &mut self.nexts_mut()[0]
    }

    /// Number of characters stored in this node (read off the level-0 link,
    /// which always spans exactly this node's own content).
    pub fn num_chars(&self) -> usize {
        self.first_next().skip_chars
    }
}
