//! Core traits shared by the frequency structures
//!
//! [`FrequencySource`] is the seam between a counting structure and a
//! [`BoundedTopK`](crate::frequency::BoundedTopK) summary that sits on top of
//! it. [`HeavyHitters`] is the two-operation surface every top-k counter
//! exposes, including external baselines.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use crate::frequency::FrequencyMatrix;

/// Something that can count keys and report a count per key
pub trait FrequencySource<K: ?Sized> {
    /// Record one occurrence of `key` and return its updated count
    fn record(&mut self, key: &K) -> u64;

    /// Current count for `key` without recording anything
    fn estimate(&self, key: &K) -> u64;
}

impl<K: AsRef<[u8]> + ?Sized> FrequencySource<K> for FrequencyMatrix {
    fn record(&mut self, key: &K) -> u64 {
        self.increment(key)
    }

    fn estimate(&self, key: &K) -> u64 {
        self.query(key)
    }
}

/// A matrix shared between several summaries, e.g. one per shard
impl<K: AsRef<[u8]> + ?Sized> FrequencySource<K> for Arc<FrequencyMatrix> {
    fn record(&mut self, key: &K) -> u64 {
        self.increment(key)
    }

    fn estimate(&self, key: &K) -> u64 {
        self.query(key)
    }
}

/// Heavy hitters / top-k counter
///
/// This is the whole contract a baseline counter has to satisfy to be
/// compared against the structures in this crate.
pub trait HeavyHitters<K: Hash + Eq> {
    /// Feed one occurrence of `key`
    fn process(&mut self, key: K);

    /// Currently tracked keys and their counts
    fn top_k(&self) -> HashMap<K, u64>;
}

/// Count with a bounded overcount
///
/// The true count lies in `[value - error, value]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Estimate {
    /// Upper bound on the true count
    pub value: u64,
    /// Maximum overcount
    pub error: u64,
}

impl Estimate {
    pub fn new(value: u64, error: u64) -> Self {
        Self { value, error }
    }

    /// Guaranteed minimum count
    pub fn lower_bound(&self) -> u64 {
        self.value.saturating_sub(self.error)
    }

    pub fn upper_bound(&self) -> u64 {
        self.value
    }

    /// Check if a count falls within bounds
    pub fn contains(&self, count: u64) -> bool {
        count >= self.lower_bound() && count <= self.upper_bound()
    }

    /// True when the count carries no overcount at all
    pub fn is_exact(&self) -> bool {
        self.error == 0
    }
}
