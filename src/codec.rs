//! UTF-8 / UTF-16 arithmetic over string slices.
//!
//! The rope's public `insert` takes `&str`, which the type system already
//! guarantees is well-formed UTF-8 - so unlike the C original (which had to
//! validate a raw, NUL-terminated byte pointer before touching it) this
//! crate never re-validates. What's left is the pure arithmetic: given a
//! lead byte, how many bytes does this scalar value take, and - since a
//! node's chunk boundary can fall in the middle of a `&str` - converting
//! between a character offset and a byte offset within one chunk.

/// Number of bytes a UTF-8 scalar value occupies, given its lead byte.
///
/// Every byte that can legally start a `str` falls into one of these
/// ranges; continuation bytes (`0x80..=0xBF`) and the two bytes UTF-8
/// reserves but never uses (`0xFE`, `0xFF`) can't appear as a lead byte in
/// a value the standard library has already validated as `&str`, so callers
/// only ever invoke this on a byte returned from `str::as_bytes()` at a
/// char boundary.
#[inline]
pub(crate) fn codepoint_size(lead_byte: u8) -> usize {
    match lead_byte {
        0x00..=0x7f => 1,
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => unreachable!("not a valid utf8 lead byte in a validated &str: {lead_byte:#x}"),
    }
}

/// Walk forward `n` scalar values in `s` and return the byte offset just
/// past them. If `s` has fewer than `n` characters, returns `s.len()`.
#[inline]
pub(crate) fn bytes_in_first_n_chars(s: &str, n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    let mut chars = 0;
    for (byte_pos, _) in s.char_indices() {
        if chars == n {
            return byte_pos;
        }
        chars += 1;
    }
    s.len()
}

/// Count the scalar values in the first `b` bytes of `s`. `b` must land on
/// a char boundary (callers only ever pass offsets derived from a node's
/// own metrics, so this always holds).
#[inline]
pub(crate) fn chars_in_first_n_bytes(s: &str, b: usize) -> usize {
    debug_assert!(s.is_char_boundary(b));
    s.as_bytes()[..b].iter().filter(|&&byte| !is_continuation_byte(byte)).count()
}

#[inline]
fn is_continuation_byte(byte: u8) -> bool {
    byte & 0xc0 == 0x80
}

/// Count the UTF-16 code units the first `n` characters of `s` would
/// occupy if re-encoded as UTF-16.
#[cfg(feature = "wchar_conversion")]
pub(crate) fn wchars_in_first_n_chars(s: &str, n: usize) -> usize {
    s.chars().take(n).map(char::len_utf16).sum()
}

/// Inverse of [`wchars_in_first_n_chars`]: how many whole characters does
/// it take to reach `w` UTF-16 code units? If `w` lands between a
/// surrogate pair's two halves, the caller has passed an invalid position;
/// we round down to the character that contains it, since that's the
/// cheapest-to-reason-about choice and never panics.
#[cfg(feature = "wchar_conversion")]
pub(crate) fn chars_in_first_n_wchars(s: &str, w: usize) -> usize {
    let mut seen_wchars = 0;
    let mut chars = 0;
    for c in s.chars() {
        if seen_wchars >= w {
            break;
        }
        seen_wchars += c.len_utf16();
        chars += 1;
    }
    chars
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codepoint_size_matches_char_len_utf8() {
        for c in ['a', '\u{7f}', '\u{80}', '\u{7ff}', '\u{800}', 'κ', '\u{ffff}', '𝕐', '\u{10ffff}'] {
            let mut buf = [0u8; 4];
            let s = c.encode_utf8(&mut buf);
            assert_eq!(codepoint_size(s.as_bytes()[0]), c.len_utf8());
        }
    }

    #[test]
    fn bytes_and_chars_round_trip() {
        let s = "κόσμε";
        assert_eq!(s.chars().count(), 5);
        for n in 0..=5 {
            let b = bytes_in_first_n_chars(s, n);
            assert_eq!(chars_in_first_n_bytes(s, b), n);
        }
        assert_eq!(bytes_in_first_n_chars(s, 100), s.len());
    }

    #[test]
    fn bytes_in_first_n_chars_empty() {
        assert_eq!(bytes_in_first_n_chars("", 0), 0);
        assert_eq!(bytes_in_first_n_chars("abc", 0), 0);
    }

    #[cfg(feature = "wchar_conversion")]
    #[test]
    fn wchar_counts_non_bmp() {
        // Each of these three scalars is outside the BMP and costs 2 code units.
        let s = "𝕐𝕆𝌀";
        assert_eq!(wchars_in_first_n_chars(s, 3), 6);
        assert_eq!(chars_in_first_n_wchars(s, 6), 3);
        assert_eq!(chars_in_first_n_wchars(s, 2), 1);
    }
}
