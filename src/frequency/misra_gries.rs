//! Misra-Gries frequent items
//!
//! Baseline counter with no special data structure: at most `k` counters in a
//! map, and a miss on a full map decrements every counter instead of
//! admitting the new key. Counts are lower bounds; the undercount is at most
//! `n / (k + 1)` after `n` updates.

use std::collections::HashMap;
use std::hash::Hash;

use crate::error::{ensure_positive, ConstructionResult};
use crate::traits::HeavyHitters;

/// Decrement-all heavy hitter counter
///
/// # Example
///
/// ```
/// use heavy_hitters::frequency::MisraGries;
/// use heavy_hitters::traits::HeavyHitters;
///
/// let mut mg = MisraGries::new(2).unwrap();
/// for w in "a a a b c".split(' ') {
///     mg.process(w);
/// }
/// assert_eq!(mg.top_k().get("a"), Some(&2));
/// ```
#[derive(Clone, Debug)]
pub struct MisraGries<K> {
    k: usize,
    counters: HashMap<K, u64>,
    processed: u64,
}

impl<K: Hash + Eq + Clone> MisraGries<K> {
    /// # Errors
    ///
    /// Returns an error if `k` is zero
    pub fn new(k: usize) -> ConstructionResult<Self> {
        let k = ensure_positive("k", k)?;
        Ok(Self {
            k,
            counters: HashMap::with_capacity(k),
            processed: 0,
        })
    }

    /// Lower bound on the count of `key`
    pub fn count(&self, key: &K) -> u64 {
        self.counters.get(key).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Maximum undercount of any key, `processed / (k + 1)`
    pub fn error_bound(&self) -> u64 {
        self.processed / (self.k as u64 + 1)
    }
}

impl<K: Hash + Eq + Clone> HeavyHitters<K> for MisraGries<K> {
    fn process(&mut self, key: K) {
        self.processed += 1;

        if let Some(count) = self.counters.get_mut(&key) {
            *count += 1;
        } else if self.counters.len() < self.k {
            self.counters.insert(key, 1);
        } else {
            self.counters.retain(|_, count| {
                *count -= 1;
                *count > 0
            });
        }
    }

    fn top_k(&self) -> HashMap<K, u64> {
        self.counters.clone()
    }
}
