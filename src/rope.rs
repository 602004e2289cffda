//! The rope itself: the sentinel head, the total counters, and the public
//! insert/delete/query API built on top of [`crate::node`] and
//! [`crate::cursor`].

use std::ops::Range;
use std::{ptr, str};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::alloc::{ChunkAllocator, GlobalAllocator};
use crate::codec;
use crate::cursor::{self, RopeCursor};
use crate::error::RopeError;
use crate::node::{Node, SkipEntry, BIAS, MAX_HEIGHT, NODE_STR_SIZE};

/// Byte/char(/wchar) counts of a string to be inserted, computed once up
/// front so every place that needs them (in-place splice, node split, link
/// bookkeeping) agrees.
struct Metrics {
    bytes: usize,
    chars: usize,
    #[cfg(feature = "wchar_conversion")]
    wchars: usize,
}

impl Metrics {
    fn of(s: &str) -> Self {
        Metrics {
            bytes: s.len(),
            chars: s.chars().count(),
            #[cfg(feature = "wchar_conversion")]
            wchars: s.chars().map(char::len_utf16).sum(),
        }
    }
}

/// The rope's source of randomness for [`random_level`](Rope::random_level).
/// Defaults to the process-global thread RNG (secure against an adversary
/// who can predict node heights from a weak PRNG) but can be pinned to a
/// seed for reproducible tests.
enum RopeRng {
    ThreadLocal,
    Seeded(SmallRng),
}

impl RopeRng {
    fn next_u8(&mut self) -> u8 {
        match self {
            RopeRng::ThreadLocal => rand::thread_rng().gen(),
            RopeRng::Seeded(rng) => rng.gen(),
        }
    }
}

/// An indexed rope: a skip list of UTF-8 chunks supporting logarithmic
/// insert-at-position and delete-at-position.
///
/// Generic over its [`ChunkAllocator`] so callers who need to count or
/// control node allocations can supply their own; `Rope::new()` uses
/// [`GlobalAllocator`].
///
/// Not `Send`/`Sync`: a rope is single-owner and single-threaded.
#[repr(C)]
pub struct Rope<A: ChunkAllocator = GlobalAllocator> {
    num_bytes: usize,
    #[cfg(feature = "wchar_conversion")]
    num_wchars: usize,
    rng: RopeRng,
    alloc: A,
    // `head` owns no content; its height is the rope's current
    // max_active_level. Its `nexts` field is zero-length in `Node`'s
    // declaration - the slots it actually indexes into are
    // `head_nexts_overflow`, which `#[repr(C)]` guarantees sits immediately
    // after it in memory. This lets `head`'s height grow without ever
    // reallocating the head itself.
    head: Node,
    head_nexts_overflow: [SkipEntry; MAX_HEIGHT + 1],
}

impl Rope<GlobalAllocator> {
    /// A new, empty rope using the global allocator.
    pub fn new() -> Self {
        Self::new_with_allocator(GlobalAllocator)
    }

    /// An empty rope whose `random_level` draws are deterministic, seeded
    /// from `seed`. Intended for tests and fuzzing, where reproducible node
    /// heights matter more than unpredictability.
    pub fn new_with_seed(seed: u64) -> Self {
        let mut rope = Self::new();
        rope.rng = RopeRng::Seeded(SmallRng::seed_from_u64(seed));
        rope
    }
}

impl Default for Rope<GlobalAllocator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ChunkAllocator> Rope<A> {
    /// A new, empty rope that allocates chunk nodes through `alloc`.
    pub fn new_with_allocator(alloc: A) -> Self {
        Rope {
            num_bytes: 0,
            #[cfg(feature = "wchar_conversion")]
            num_wchars: 0,
            rng: if cfg!(feature = "ddos_protection") {
                RopeRng::ThreadLocal
            } else {
                RopeRng::Seeded(SmallRng::from_entropy())
            },
            alloc,
            head: Node {
                str: [0; NODE_STR_SIZE],
                num_bytes: 0,
                height: 1,
                nexts: [],
            },
            head_nexts_overflow: [SkipEntry::new(); MAX_HEIGHT + 1],
        }
    }

    fn head(&self) -> &Node {
        &self.head
    }

    fn head_mut(&mut self) -> &mut Node {
        &mut self.head
    }

    /// Draw a random node height: geometric distribution, `BIAS`/256
    /// chance of each extra level, capped one below `MAX_HEIGHT` so the
    /// head sentinel can always be strictly taller.
    fn random_level(&mut self) -> u8 {
        let mut h: u8 = 1;
        while (h as usize) < MAX_HEIGHT - 1 && self.rng.next_u8() < BIAS {
            h += 1;
        }
        h
    }

    /// Number of Unicode scalar values in the rope. O(1).
    pub fn len_chars(&self) -> usize {
        let top = self.head().height as usize - 1;
        self.head().nexts()[top].skip_chars
    }

    /// Number of bytes the rope's UTF-8 encoding occupies. O(1).
    pub fn len_bytes(&self) -> usize {
        self.num_bytes
    }

    /// Number of UTF-16 code units the rope's content would occupy if
    /// re-encoded as UTF-16. O(1).
    #[cfg(feature = "wchar_conversion")]
    pub fn len_wchars(&self) -> usize {
        self.num_wchars
    }

    /// `true` if the rope holds no characters.
    pub fn is_empty(&self) -> bool {
        self.num_bytes == 0
    }

    /// Write the rope's content, chunk by chunk, into `w`. Avoids
    /// materializing the whole rope into an intermediate `String` when the
    /// caller already has somewhere to stream it.
    pub fn write_to(&self, w: &mut impl std::fmt::Write) -> std::fmt::Result {
        for chunk in self.chunks() {
            w.write_str(chunk.as_str())?;
        }
        Ok(())
    }

    fn cursor_at_char(&self, char_pos: usize) -> RopeCursor {
        assert!(char_pos <= self.len_chars(), "char_pos out of bounds");
        cursor::search_at_char(self.head(), self.head().height as usize, char_pos)
    }

    #[cfg(feature = "wchar_conversion")]
    fn cursor_at_wchar(&self, wchar_pos: usize) -> (RopeCursor, usize) {
        assert!(wchar_pos <= self.len_wchars(), "wchar_pos out of bounds");
        cursor::search_at_wchar(self.head(), self.head().height as usize, wchar_pos)
    }

    /// Insert `content` at character position `pos`, clamped to
    /// `[0, len_chars()]`. A no-op if `content` is empty.
    pub fn insert(&mut self, pos: usize, content: &str) {
        if content.is_empty() {
            return;
        }
        let pos = pos.min(self.len_chars());
        let mut cursor = self.cursor_at_char(pos);
        unsafe {
            self.insert_at_cursor(&mut cursor, content);
        }
        if cfg!(debug_assertions) {
            self.check();
        }
    }

    /// Insert raw, possibly-invalid bytes. Validates before touching the
    /// rope; on `Err`, the rope is byte-for-byte unchanged.
    pub fn try_insert(&mut self, pos: usize, bytes: &[u8]) -> Result<(), RopeError> {
        let s = str::from_utf8(bytes).map_err(|_| RopeError::InvalidUtf8)?;
        self.insert(pos, s);
        Ok(())
    }

    /// Insert `content` at UTF-16 code-unit position `wchar_pos`, clamped
    /// to `[0, len_wchars()]`. Returns the character position actually
    /// used, since a UTF-16 caller's positions and this rope's character
    /// positions diverge once any non-BMP scalar has been inserted.
    #[cfg(feature = "wchar_conversion")]
    pub fn insert_at_wchar(&mut self, wchar_pos: usize, content: &str) -> usize {
        let wchar_pos = wchar_pos.min(self.len_wchars());
        let char_pos = self.char_pos_at_wchar(wchar_pos);
        if content.is_empty() {
            return char_pos;
        }
        let mut char_cursor = self.cursor_at_char(char_pos);
        unsafe {
            self.insert_at_cursor(&mut char_cursor, content);
        }
        if cfg!(debug_assertions) {
            self.check();
        }
        char_pos
    }

    /// Resolve a UTF-16 code-unit position to the character position it
    /// lands at: build a `cursor_at_wchar`, then convert the residual
    /// wchar offset inside the destination chunk to a residual char offset
    /// and add it to the char count accumulated during the same search.
    #[cfg(feature = "wchar_conversion")]
    fn char_pos_at_wchar(&self, wchar_pos: usize) -> usize {
        let (cursor, chars_before) = self.cursor_at_wchar(wchar_pos);
        let node = unsafe { &*cursor.here_ptr() };
        let residual_chars = codec::chars_in_first_n_wchars(node.as_str(), cursor.0[0].skip_wchars);
        chars_before + residual_chars
    }

    /// Remove the characters in `range`, clamped to `[0, len_chars()]`. A
    /// no-op if the (clamped) range is empty.
    pub fn remove(&mut self, range: Range<usize>) {
        let total = self.len_chars();
        let start = range.start.min(total);
        let end = range.end.min(total);
        if end <= start {
            return;
        }
        let count = end - start;
        let mut cursor = self.cursor_at_char(start);
        unsafe {
            self.remove_at_cursor(&mut cursor, count);
        }
        if cfg!(debug_assertions) {
            self.check();
        }
    }

    /// Remove the UTF-16 code units in `wchar_range`, clamped to
    /// `[0, len_wchars()]`. Returns the character range actually removed.
    #[cfg(feature = "wchar_conversion")]
    pub fn remove_at_wchar(&mut self, wchar_range: Range<usize>) -> Range<usize> {
        let total = self.len_wchars();
        let start = wchar_range.start.min(total);
        let end = wchar_range.end.min(total);
        if end <= start {
            let char_pos = self.char_pos_at_wchar(start);
            return char_pos..char_pos;
        }

        let start_char = self.char_pos_at_wchar(start);
        let end_char = self.char_pos_at_wchar(end);

        let mut cursor = self.cursor_at_char(start_char);
        unsafe {
            self.remove_at_cursor(&mut cursor, end_char - start_char);
        }
        if cfg!(debug_assertions) {
            self.check();
        }
        start_char..end_char
    }

    /// Splice a brand-new, fully-populated node into the skip list at
    /// `cursor`'s position, and advance `cursor` to the new node's end.
    unsafe fn insert_node_at(&mut self, cursor: &mut RopeCursor, contents: &str, metrics: &Metrics) {
        debug_assert_eq!(contents.chars().count(), metrics.chars);
        debug_assert!(contents.len() <= NODE_STR_SIZE);

        let new_height = self.random_level();
        let new_node = Node::alloc_with_height(new_height, &self.alloc);
        (*new_node).num_bytes = contents.len() as u8;
        (*new_node).str[..contents.len()].copy_from_slice(contents.as_bytes());
        let new_height = new_height as usize;

        // Grow the head if this node is taller than anything we've seen.
        let mut head_height = self.head().height as usize;
        while head_height <= new_height {
            self.head_nexts_overflow[head_height] = self.head_nexts_overflow[head_height - 1];
            cursor.0[head_height] = cursor.0[head_height - 1];
            self.head_mut().height += 1;
            head_height += 1;
        }

        for i in 0..new_height {
            let prev = &mut (*cursor.0[i].node).nexts_mut()[i];
            let new_links = (*new_node).nexts_mut();

            new_links[i].node = prev.node;
            new_links[i].skip_chars = metrics.chars + prev.skip_chars - cursor.0[i].skip_chars;
            #[cfg(feature = "wchar_conversion")]
            {
                new_links[i].skip_wchars = metrics.wchars + prev.skip_wchars - cursor.0[i].skip_wchars;
            }

            prev.node = new_node;
            prev.skip_chars = cursor.0[i].skip_chars;
            #[cfg(feature = "wchar_conversion")]
            {
                prev.skip_wchars = cursor.0[i].skip_wchars;
            }

            cursor.0[i].node = new_node;
            cursor.0[i].skip_chars = metrics.chars;
            #[cfg(feature = "wchar_conversion")]
            {
                cursor.0[i].skip_wchars = metrics.wchars;
            }
        }

        for i in new_height..head_height {
            let link = &mut (*cursor.0[i].node).nexts_mut()[i];
            link.skip_chars += metrics.chars;
            cursor.0[i].skip_chars += metrics.chars;
            #[cfg(feature = "wchar_conversion")]
            {
                link.skip_wchars += metrics.wchars;
                cursor.0[i].skip_wchars += metrics.wchars;
            }
        }

        self.num_bytes += contents.len();
        #[cfg(feature = "wchar_conversion")]
        {
            self.num_wchars += metrics.wchars;
        }
    }

    /// Insert `content` at `cursor`'s position, choosing in-place,
    /// next-node-prepend, or split.
    unsafe fn insert_at_cursor(&mut self, cursor: &mut RopeCursor, content: &str) {
        let mut offset = cursor.0[0].skip_chars;
        let mut e = cursor.here_ptr();
        let mut offset_bytes = 0usize;
        if offset > 0 {
            let s = (*e).as_str();
            offset_bytes = codec::bytes_in_first_n_chars(s, offset);
        }

        let metrics = Metrics::of(content);

        let mut insert_here = (*e).num_bytes as usize + metrics.bytes <= NODE_STR_SIZE;

        if !insert_here && offset_bytes == (*e).num_bytes as usize {
            if let Some(next) = (*e).first_next_mut().node.as_mut() {
                if next.num_bytes as usize + metrics.bytes <= NODE_STR_SIZE {
                    offset = 0;
                    offset_bytes = 0;
                    for i in 0..next.height as usize {
                        cursor.0[i].node = next;
                    }
                    e = next;
                    insert_here = true;
                }
            }
        }

        if insert_here {
            let c = &mut (*e).str;
            if offset_bytes < (*e).num_bytes as usize {
                ptr::copy(
                    &c[offset_bytes],
                    &mut c[offset_bytes + metrics.bytes],
                    (*e).num_bytes as usize - offset_bytes,
                );
            }
            ptr::copy_nonoverlapping(content.as_ptr(), &mut c[offset_bytes], metrics.bytes);

            (*e).num_bytes += metrics.bytes as u8;
            self.num_bytes += metrics.bytes;
            #[cfg(feature = "wchar_conversion")]
            {
                self.num_wchars += metrics.wchars;
            }

            cursor.bump_char_offsets(self.head().height as usize, metrics.chars as isize);
            #[cfg(feature = "wchar_conversion")]
            {
                cursor.bump_wchar_offsets(self.head().height as usize, metrics.wchars as isize);
            }
        } else {
            // Split: detach the tail of the current chunk (bytes stay put,
            // but they're logically removed from `e`) and reinsert it after
            // the new content.
            let num_end_bytes = (*e).num_bytes as usize - offset_bytes;
            let end_str: Option<(String, usize)> = if num_end_bytes > 0 {
                let s = (*e).as_str();
                let end_str = s[offset_bytes..].to_string();
                let num_end_chars = (*e).num_chars() - offset;
                #[cfg(feature = "wchar_conversion")]
                let num_end_wchars = codec::wchars_in_first_n_chars(&end_str, num_end_chars);

                (*e).num_bytes = offset_bytes as u8;
                self.num_bytes -= num_end_bytes;
                cursor.bump_char_offsets(self.head().height as usize, -(num_end_chars as isize));
                #[cfg(feature = "wchar_conversion")]
                {
                    self.num_wchars -= num_end_wchars;
                    cursor.bump_wchar_offsets(self.head().height as usize, -(num_end_wchars as isize));
                }

                Some((end_str, num_end_chars))
            } else {
                None
            };

            let mut remainder = content;
            while !remainder.is_empty() {
                // Greedy lead-byte walk: grow byte_pos one scalar at a time,
                // never landing in the middle of one, until the next scalar
                // would push the chunk past NODE_STR_SIZE.
                let bytes = remainder.as_bytes();
                let mut byte_pos = 0;
                let mut char_pos = 0;
                while byte_pos < bytes.len() {
                    let cs = codec::codepoint_size(bytes[byte_pos]);
                    if byte_pos + cs > NODE_STR_SIZE {
                        break;
                    }
                    byte_pos += cs;
                    char_pos += 1;
                }
                let (chunk, rest) = remainder.split_at(byte_pos);
                assert!(!chunk.is_empty());
                let chunk_metrics = Metrics::of(chunk);
                debug_assert_eq!(chunk_metrics.chars, char_pos);
                self.insert_node_at(cursor, chunk, &chunk_metrics);
                remainder = rest;
            }

            if let Some((end_str, _num_end_chars)) = end_str {
                let end_metrics = Metrics::of(&end_str);
                self.insert_node_at(cursor, &end_str, &end_metrics);
            }
        }
    }

    /// Remove `count` characters starting at `cursor`'s position.
    unsafe fn remove_at_cursor(&mut self, cursor: &mut RopeCursor, mut count: usize) {
        let mut offset = cursor.0[0].skip_chars;
        let mut e = cursor.here_ptr();

        while count > 0 {
            if offset == (*e).first_next().skip_chars {
                e = (*e).first_next().node;
                offset = 0;
            }

            let node_chars = (*e).num_chars();
            let removed = count.min(node_chars - offset);
            assert!(removed > 0);

            let height = (*e).height as usize;
            #[cfg(feature = "wchar_conversion")]
            let removed_wchars;

            if removed < node_chars || std::ptr::eq(e, self.head() as *const Node) {
                // Partial trim.
                let s = (*e).as_str();
                let leading_bytes = codec::bytes_in_first_n_chars(s, offset);
                let removed_bytes = codec::bytes_in_first_n_chars(&s[leading_bytes..], removed);
                let trailing_bytes = (*e).num_bytes as usize - leading_bytes - removed_bytes;

                #[cfg(feature = "wchar_conversion")]
                {
                    removed_wchars =
                        codec::wchars_in_first_n_chars(&s[leading_bytes..leading_bytes + removed_bytes], removed);
                }

                let c = &mut (*e).str;
                if trailing_bytes > 0 {
                    ptr::copy(
                        &c[leading_bytes + removed_bytes],
                        &mut c[leading_bytes],
                        trailing_bytes,
                    );
                }

                (*e).num_bytes -= removed_bytes as u8;
                self.num_bytes -= removed_bytes;
                #[cfg(feature = "wchar_conversion")]
                {
                    self.num_wchars -= removed_wchars;
                }

                for link in (*e).nexts_mut() {
                    link.skip_chars -= removed;
                    #[cfg(feature = "wchar_conversion")]
                    {
                        link.skip_wchars -= removed_wchars;
                    }
                }
            } else {
                // Whole-node removal.
                #[cfg(feature = "wchar_conversion")]
                {
                    removed_wchars = (*e).first_next().skip_wchars;
                }

                for i in 0..(*e).height as usize {
                    let pred = &mut (*cursor.0[i].node).nexts_mut()[i];
                    let old = (*e).nexts()[i];
                    pred.node = old.node;
                    pred.skip_chars += old.skip_chars - removed;
                    #[cfg(feature = "wchar_conversion")]
                    {
                        pred.skip_wchars += old.skip_wchars - removed_wchars;
                    }
                }

                self.num_bytes -= (*e).num_bytes as usize;
                #[cfg(feature = "wchar_conversion")]
                {
                    self.num_wchars -= removed_wchars;
                }
                let next = (*e).first_next().node;
                Node::free(e, &self.alloc);
                e = next;
            }

            let head_height = self.head().height as usize;
            for i in height..head_height {
                let link = &mut (*cursor.0[i].node).nexts_mut()[i];
                link.skip_chars -= removed;
                #[cfg(feature = "wchar_conversion")]
                {
                    link.skip_wchars -= removed_wchars;
                }
            }

            count -= removed;
        }
    }
}

impl<A: ChunkAllocator> Drop for Rope<A> {
    fn drop(&mut self) {
        let mut node = self.head().first_next().node;
        unsafe {
            while !node.is_null() {
                let next = (*node).first_next().node;
                Node::free(node, &self.alloc);
                node = next;
            }
        }
    }
}

impl<A: ChunkAllocator> Clone for Rope<A> {
    fn clone(&self) -> Self {
        let mut r = Rope::new_with_allocator(self.alloc.clone());
        r.num_bytes = self.num_bytes;
        #[cfg(feature = "wchar_conversion")]
        {
            r.num_wchars = self.num_wchars;
        }

        let head_str = self.head().as_str();
        r.head.str[..head_str.len()].copy_from_slice(head_str.as_bytes());
        r.head.num_bytes = self.head().num_bytes;
        r.head.height = self.head().height;

        for i in 0..self.head().height as usize {
            r.head_nexts_overflow[i].skip_chars = self.head().nexts()[i].skip_chars;
            #[cfg(feature = "wchar_conversion")]
            {
                r.head_nexts_overflow[i].skip_wchars = self.head().nexts()[i].skip_wchars;
            }
        }

        // `last_at_level[i]` is the most-recently-cloned node whose level-i
        // link we still need to point at the next clone.
        let mut last_at_level = vec![&mut r.head as *mut Node; MAX_HEIGHT];

        let mut other = unsafe { self.head().first_next().node.as_ref() };
        while let Some(src) = other {
            unsafe {
                let height = src.height;
                let node = Node::alloc_with_height(height, &r.alloc);
                (*node).num_bytes = src.num_bytes;
                let len = src.num_bytes as usize;
                (*node).str[..len].copy_from_slice(&src.str[..len]);

                let src_links = src.nexts();
                let dst_links = (*node).nexts_mut();
                for i in 0..height as usize {
                    dst_links[i].skip_chars = src_links[i].skip_chars;
                    #[cfg(feature = "wchar_conversion")]
                    {
                        dst_links[i].skip_wchars = src_links[i].skip_wchars;
                    }
                    (*last_at_level[i]).nexts_mut()[i].node = node;
                    last_at_level[i] = node;
                }

                other = src.first_next().node.as_ref();
            }
        }

        r
    }
}

impl<A: ChunkAllocator> PartialEq for Rope<A> {
    fn eq(&self, other: &Self) -> bool {
        if self.num_bytes != other.num_bytes || self.len_chars() != other.len_chars() {
            return false;
        }

        let mut other_chunks = other.chunks().map(|c| c.as_str());
        let mut other_chunk = other_chunks.next();
        let mut other_pos = 0usize;

        for chunk in self.chunks() {
            let s = chunk.as_str();
            let mut pos = 0usize;
            while pos < s.len() {
                match other_chunk {
                    Some(os) => {
                        let amt = (s.len() - pos).min(os.len() - other_pos);
                        if s[pos..pos + amt] != os[other_pos..other_pos + amt] {
                            return false;
                        }
                        pos += amt;
                        other_pos += amt;
                        if other_pos == os.len() {
                            other_chunk = other_chunks.next();
                            other_pos = 0;
                        }
                    }
                    None => return false,
                }
            }
        }

        true
    }
}

impl<A: ChunkAllocator> Eq for Rope<A> {}

impl<'a> From<&'a str> for Rope<GlobalAllocator> {
    fn from(s: &'a str) -> Self {
        let mut rope = Rope::new();
        rope.insert(0, s);
        rope
    }
}

impl From<String> for Rope<GlobalAllocator> {
    fn from(s: String) -> Self {
        Rope::from(s.as_str())
    }
}

impl<'a> TryFrom<&'a [u8]> for Rope<GlobalAllocator> {
    type Error = RopeError;

    fn try_from(bytes: &'a [u8]) -> Result<Self, Self::Error> {
        let mut rope = Rope::new();
        rope.try_insert(0, bytes)?;
        Ok(rope)
    }
}

impl<A: ChunkAllocator> std::fmt::Display for Rope<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for chunk in self.chunks() {
            f.write_str(chunk.as_str())?;
        }
        Ok(())
    }
}

impl<A: ChunkAllocator> std::fmt::Debug for Rope<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rope")
            .field("len_chars", &self.len_chars())
            .field("len_bytes", &self.len_bytes())
            .finish()
    }
}
