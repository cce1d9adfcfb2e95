//! Exact per-key counting
//!
//! One counter per distinct key, so memory grows with the key space. Useful
//! as a frequency source for a small [`BoundedTopK`](super::BoundedTopK) and
//! as ground truth in tests.

use std::collections::HashMap;
use std::hash::Hash;

use crate::traits::FrequencySource;

/// Exact frequency counter
///
/// Not thread-safe; wrap it or shard it for concurrent use.
#[derive(Clone, Debug)]
pub struct ExactCounter<K> {
    counts: HashMap<K, u64>,
    total: u64,
}

impl<K: Hash + Eq> ExactCounter<K> {
    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
            total: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            counts: HashMap::with_capacity(capacity),
            total: 0,
        }
    }

    /// Add `amount` to `key` and return the new count
    pub fn add(&mut self, key: K, amount: u64) -> u64 {
        self.total = self.total.saturating_add(amount);
        let count = self.counts.entry(key).or_insert(0);
        *count = count.saturating_add(amount);
        *count
    }

    pub fn count(&self, key: &K) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Number of distinct keys seen
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Sum of all counts
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> {
        self.counts.iter().map(|(k, &c)| (k, c))
    }

    pub fn clear(&mut self) {
        self.counts.clear();
        self.total = 0;
    }
}

impl<K: Hash + Eq> Default for ExactCounter<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq + Clone> FrequencySource<K> for ExactCounter<K> {
    fn record(&mut self, key: &K) -> u64 {
        if let Some(count) = self.counts.get_mut(key) {
            *count = count.saturating_add(1);
            self.total = self.total.saturating_add(1);
            return *count;
        }
        self.add(key.clone(), 1)
    }

    fn estimate(&self, key: &K) -> u64 {
        self.count(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record() {
        let mut counter = ExactCounter::new();
        assert_eq!(counter.record(&"a"), 1);
        assert_eq!(counter.record(&"a"), 2);
        assert_eq!(counter.record(&"b"), 1);

        assert_eq!(counter.count(&"a"), 2);
        assert_eq!(counter.estimate(&"missing"), 0);
        assert_eq!(counter.distinct(), 2);
        assert_eq!(counter.total(), 3);
    }

    #[test]
    fn test_add_and_clear() {
        let mut counter = ExactCounter::with_capacity(4);
        assert_eq!(counter.add("x".to_string(), 5), 5);
        assert_eq!(counter.add("x".to_string(), 2), 7);

        counter.clear();
        assert_eq!(counter.count(&"x".to_string()), 0);
        assert_eq!(counter.total(), 0);
    }
}
