//! Invariant checker. Recomputes the rope's metrics from scratch via a
//! level-0 walk and asserts every structural invariant holds. Always
//! compiled - tests and any external property/fuzz harness call
//! `Rope::check` directly - and additionally invoked by every mutating
//! method under `debug_assertions`, asserting liberally rather than relying
//! solely on an opt-in checker.

use crate::alloc::ChunkAllocator;
use crate::node::{Node, MAX_HEIGHT};
use crate::rope::Rope;

impl<A: ChunkAllocator> Rope<A> {
    /// Recompute totals from scratch and assert every structural invariant
    /// holds. Intended for tests and debug builds; panics on violation.
    pub fn check(&self) {
        let head = self.head();
        assert!(head.height >= 1, "invariant: max_active_level >= 1");
        assert!(
            (head.height as usize) <= MAX_HEIGHT,
            "no node may exceed MAX_HEIGHT"
        );

        let top = head.height as usize - 1;
        let top_link = head.nexts()[top];
        assert!(top_link.node.is_null(), "invariant: top level link.next = None");

        // Running per-level cumulative totals, seeded at the head.
        let mut running = [0usize; MAX_HEIGHT + 1];
        #[cfg(feature = "wchar_conversion")]
        let mut running_w = [0usize; MAX_HEIGHT + 1];

        let mut total_chars = 0usize;
        let mut total_bytes = 0usize;
        #[cfg(feature = "wchar_conversion")]
        let mut total_wchars = 0usize;

        // `frontier[i]` is the node whose level-i link we expect to land on
        // next, and the cumulative char count up to its start.
        let mut frontier: Vec<*const Node> = vec![head as *const Node; head.height as usize];

        let mut node: &Node = head;
        loop {
            assert!(
                std::ptr::eq(node, head) || node.num_bytes > 0,
                "invariant: every non-head node has >= 1 byte"
            );
            assert!(
                node.num_bytes as usize <= crate::node::NODE_STR_SIZE,
                "invariant: every node respects its chunk capacity"
            );
            assert_eq!(
                node.as_str().chars().count(),
                node.num_chars(),
                "invariant: node content parses as whole scalar values"
            );

            for (level, link) in node.nexts().iter().enumerate() {
                assert!(
                    std::ptr::eq(frontier[level], node),
                    "invariant: level-{level} chain must visit nodes in order"
                );
                assert_eq!(
                    running[level], total_chars,
                    "invariant: level-{level} cumulative char span mismatch"
                );
                #[cfg(feature = "wchar_conversion")]
                assert_eq!(
                    running_w[level], total_wchars,
                    "invariant: level-{level} cumulative wchar span mismatch"
                );

                running[level] += link.skip_chars;
                #[cfg(feature = "wchar_conversion")]
                {
                    running_w[level] += link.skip_wchars;
                }
                frontier[level] = link.node;
            }

            total_bytes += node.num_bytes as usize;
            total_chars += node.num_chars();
            #[cfg(feature = "wchar_conversion")]
            {
                total_wchars += node.first_next().skip_wchars;
            }

            match unsafe { node.first_next().node.as_ref() } {
                Some(next) => node = next,
                None => break,
            }
        }

        for (level, &n) in frontier.iter().enumerate() {
            assert!(n.is_null(), "invariant: level-{level} chain must end at None");
            assert_eq!(running[level], total_chars, "invariant: final level-{level} char span");
        }

        assert!(total_bytes >= total_chars, "invariant: byte_count >= char_count");
        assert_eq!(self.len_bytes(), total_bytes, "byte_count tracks the walked total");
        assert_eq!(self.len_chars(), total_chars, "char_count tracks the walked total");
        #[cfg(feature = "wchar_conversion")]
        assert_eq!(self.len_wchars(), total_wchars, "wchar_count tracks the walked total");
    }
}
