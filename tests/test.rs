use skiprope::{Rope, RopeError};

fn check(r: &Rope, expected: &str) {
    r.check();
    assert_eq!(r.len_bytes(), expected.len());
    assert_eq!(r.to_string(), expected);
    assert_eq!(r.len_chars(), expected.chars().count());
}

#[test]
fn empty_rope_has_no_content() {
    let mut r = Rope::new();
    check(&r, "");

    r.insert(0, "");
    check(&r, "");
}

#[test]
fn new_string_has_content() {
    let r = Rope::from("Hi there");
    check(&r, "Hi there");

    let r = Rope::from("κόσμε");
    check(&r, "κόσμε");
    assert_eq!(r.len_chars(), 5);
    assert_eq!(r.len_bytes(), 10);
}

#[test]
fn insert_at_location() {
    let mut r = Rope::new();

    r.insert(0, "AAA");
    check(&r, "AAA");

    r.insert(0, "BBB");
    check(&r, "BBBAAA");

    r.insert(6, "CCC");
    check(&r, "BBBAAACCC");

    r.insert(5, "DDD");
    check(&r, "BBBAADDDACCC");

    assert_eq!(r.len_chars(), 12);
}

#[test]
fn delete_chain() {
    let mut r = Rope::from("012345678");
    check(&r, "012345678");

    r.remove(8..9);
    check(&r, "01234567");

    r.remove(0..1);
    check(&r, "1234567");

    r.remove(5..6);
    check(&r, "123457");

    r.remove(5..6);
    check(&r, "12345");

    r.remove(0..5);
    check(&r, "");

    assert_eq!(r.len_chars(), 0);
}

#[test]
fn over_range_delete_is_clamped() {
    let mut r = Rope::new();
    r.remove(0..100);
    check(&r, "");

    r.insert(0, "hi there");
    r.remove(3..13);
    check(&r, "hi ");

    assert_eq!(r.len_chars(), 3);
}

#[test]
fn multi_byte_scalars() {
    let mut r = Rope::from("κόσμε");
    assert_eq!(r.len_chars(), 5);
    assert_eq!(r.len_bytes(), 10);

    r.insert(2, "𝕐𝕆𝌀");
    check(&r, "κό𝕐𝕆𝌀σμε");
    assert_eq!(r.len_chars(), 8);
}

#[test]
fn insert_and_delete_clamp_out_of_bounds_positions() {
    let mut r = Rope::from("short");
    r.insert(1000, "!");
    check(&r, "short!");

    r.remove(2..1000);
    check(&r, "sh");
}

#[test]
fn neutral_ops_leave_rope_unchanged() {
    let mut r = Rope::from("unchanged");
    r.insert(3, "");
    check(&r, "unchanged");

    r.remove(3..3);
    check(&r, "unchanged");
}

#[test]
fn inserts_and_deletes_that_exactly_fill_or_empty_a_chunk() {
    let chunk = "x".repeat(128);
    let mut r = Rope::from(chunk.as_str());
    check(&r, &chunk);

    r.remove(0..128);
    check(&r, "");
}

#[test]
fn inserts_that_straddle_chunk_boundaries_force_splits() {
    let mut r = Rope::from("x".repeat(128).as_str());
    r.insert(64, "MIDDLE");
    let mut expected = "x".repeat(64);
    expected.push_str("MIDDLE");
    expected.push_str(&"x".repeat(64));
    check(&r, &expected);
}

#[test]
fn long_random_ascii() {
    const CHARS: &[u8] = b" ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut seed: u64 = 0x5eed_1234;
    let mut next = move || {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        seed
    };
    let s: String = (0..2000)
        .map(|_| CHARS[(next() % CHARS.len() as u64) as usize] as char)
        .collect();

    let r = Rope::from(s.as_str());
    assert_eq!(r.len_chars(), 2000);
    check(&r, &s);

    let mut r = r;
    r.remove(1..1999);
    assert_eq!(r.len_bytes(), 2);
    assert_eq!(r.len_chars(), 2);
}

#[test]
fn invalid_utf8_is_rejected_and_rope_is_unchanged() {
    let mut r = Rope::from("before");
    let bad = [0xC0u8, 0x20];
    let result = r.try_insert(3, &bad);
    assert_eq!(result, Err(RopeError::InvalidUtf8));
    check(&r, "before");
}

#[test]
fn clone_is_independent() {
    let mut r = Rope::from("original");
    let mut copy = r.clone();

    copy.insert(0, "COPY-ONLY ");
    r.insert(0, "ORIGINAL-ONLY ");

    check(&r, "ORIGINAL-ONLY original");
    check(&copy, "COPY-ONLY original");
}

#[test]
fn equality_compares_content_not_chunk_layout() {
    let mut a = Rope::new();
    a.insert(0, "a");
    a.insert(1, "b");
    a.insert(2, "c");

    let b = Rope::from("abc");

    assert_eq!(a, b);
}

#[test]
fn chunks_concatenate_to_full_content() {
    let mut r = Rope::new();
    r.insert(0, "hello ");
    r.insert(6, "world");

    let joined: String = r.chunks().map(|c| c.as_str().to_owned()).collect();
    assert_eq!(joined, "hello world");
}

#[cfg(feature = "wchar_conversion")]
mod wchar {
    use skiprope::Rope;

    #[test]
    fn utf16_indexed_insert_and_delete() {
        let mut r = Rope::from("𐆔𐆚𐆔");
        assert_eq!(r.len_wchars(), 6);

        let removed_range = r.remove_at_wchar(2..4);
        assert_eq!(removed_range, 1..2);
        assert_eq!(r.to_string(), "𐆔𐆔");

        let char_pos = r.insert_at_wchar(2, "abcde");
        assert_eq!(char_pos, 1);
        assert_eq!(r.to_string(), "𐆔abcde𐆔");
    }

    #[test]
    fn wchar_count_tracks_non_bmp_scalars() {
        let r = Rope::from("κό𝕐𝕆𝌀σμε");
        assert_eq!(r.len_chars(), 8);
        assert_eq!(r.len_wchars(), 11);
    }
}
