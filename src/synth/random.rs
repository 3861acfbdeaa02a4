//! Random sources for template selection.
//!
//! The synthesizer never touches an RNG directly; it asks a [`RandomSource`]
//! for an index so callers can pin or seed the choice.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Picks an index uniformly from `0..len`
pub trait RandomSource: Send + Sync {
    /// Return an index in `0..len`. `len` is never zero when called by the
    /// synthesizer.
    fn pick_index(&self, len: usize) -> usize;
}

/// Thread-local RNG, the default source
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick_index(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        rand::rng().random_range(0..len)
    }
}

/// Seeded RNG for reproducible sessions
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn pick_index(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.lock().random_range(0..len)
    }
}

/// Always picks the same index, clamped to the list length
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedIndex(pub usize);

impl RandomSource for FixedIndex {
    fn pick_index(&self, len: usize) -> usize {
        self.0.min(len.saturating_sub(1))
    }
}

/// Choose an element of `items` using `rng`
pub(crate) fn choose<'a, T>(rng: &dyn RandomSource, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(rng.pick_index(items.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_index_clamps() {
        assert_eq!(FixedIndex(1).pick_index(3), 1);
        assert_eq!(FixedIndex(9).pick_index(3), 2);
        assert_eq!(FixedIndex(4).pick_index(0), 0);
    }

    #[test]
    fn test_seeded_random_is_reproducible() {
        let a = SeededRandom::new(42);
        let b = SeededRandom::new(42);
        let picks_a: Vec<usize> = (0..32).map(|_| a.pick_index(5)).collect();
        let picks_b: Vec<usize> = (0..32).map(|_| b.pick_index(5)).collect();
        assert_eq!(picks_a, picks_b);
        assert!(picks_a.iter().all(|&i| i < 5));
    }

    #[test]
    fn test_thread_random_stays_in_range() {
        let rng = ThreadRandom;
        for _ in 0..200 {
            assert!(rng.pick_index(3) < 3);
        }
    }

    #[test]
    fn test_choose_empty_slice() {
        let empty: [&str; 0] = [];
        assert!(choose(&ThreadRandom, &empty).is_none());
        assert_eq!(choose(&FixedIndex(1), &["a", "b"]), Some(&"b"));
    }
}
