//! Stress-tests the rope against a flat-string oracle under a long random
//! edit script. The oracle is deliberately the simplest possible
//! implementation (a `Vec<char>`) so that any divergence is the rope's bug,
//! not the oracle's.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use skiprope::Rope;

struct SlowString {
    chars: Vec<char>,
}

impl SlowString {
    fn new() -> Self {
        SlowString { chars: Vec::new() }
    }

    fn insert(&mut self, pos: usize, content: &str) {
        let pos = pos.min(self.chars.len());
        let mut tail = self.chars.split_off(pos);
        self.chars.extend(content.chars());
        self.chars.append(&mut tail);
    }

    fn remove(&mut self, pos: usize, len: usize) {
        let pos = pos.min(self.chars.len());
        let end = (pos + len).min(self.chars.len());
        self.chars.drain(pos..end);
    }

    fn to_string(&self) -> String {
        self.chars.iter().collect()
    }

    fn char_len(&self) -> usize {
        self.chars.len()
    }
}

const RANDOM_CHARS: &[char] = &[
    'a', 'b', 'c', '1', '2', '3', ' ', '\n', // ASCII
    '©', '¥', '½', // Latin-1 supplement
    'Ͱ', 'Δ', 'δ', 'Ϡ', // Greek
    '←', '↯', '↻', '⇈', // Arrows
    '𐆐', '𐆔', '𐆘', '𐆚', // Ancient symbols, outside the BMP
];

fn random_content(rng: &mut SmallRng, max_chars: usize) -> String {
    let n = rng.gen_range(1..=max_chars);
    (0..n).map(|_| RANDOM_CHARS[rng.gen_range(0..RANDOM_CHARS.len())]).collect()
}

fn stress(seed: u64, iterations: usize) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut rope = Rope::new_with_seed(seed);
    let mut oracle = SlowString::new();

    for _ in 0..iterations {
        let len = oracle.char_len();
        if len == 0 || rng.gen_bool(0.5) {
            let pos = rng.gen_range(0..=len);
            let content = random_content(&mut rng, 20);
            rope.insert(pos, &content);
            oracle.insert(pos, &content);
        } else {
            let pos = rng.gen_range(0..len);
            let del_len = rng.gen_range(1..=len - pos);
            rope.remove(pos..pos + del_len);
            oracle.remove(pos, del_len);
        }

        assert_eq!(rope.len_chars(), oracle.char_len());
        assert_eq!(rope.to_string(), oracle.to_string());
        rope.check();
    }
}

#[test]
fn stress_small() {
    stress(12345, 2_000);
}

#[test]
fn stress_larger() {
    stress(987_654_321, 20_000);
}

#[test]
fn clamped_positions_match_oracle() {
    let mut rope = Rope::new();
    let mut oracle = SlowString::new();

    rope.insert(1000, "start");
    oracle.insert(1000, "start");
    assert_eq!(rope.to_string(), oracle.to_string());

    rope.remove(2..1000);
    oracle.remove(2, 1000 - 2);
    assert_eq!(rope.to_string(), oracle.to_string());
}
