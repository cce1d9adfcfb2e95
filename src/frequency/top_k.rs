//! Bounded top-k summary over any frequency source
//!
//! Keeps the `k` keys with the largest counts seen so far in a size-capped
//! binary min-heap. Counts come from a [`FrequencySource`]: an
//! [`ExactCounter`] for exact counts, or a [`FrequencyMatrix`] for bounded
//! memory at the cost of overestimation.
//!
//! ```text
//!   index: HashMap<K, usize>        heap: Vec<Slot<K>> (min at 0)
//!   ┌──────┬─────┐                  ┌───┬──────────┐
//!   │ "g"  │  0  │ ───────────────► │ 0 │ ("g", 7) │
//!   │ "e"  │  2  │ ───────┐         │ 1 │ ("h", 9) │
//!   │ "h"  │  1  │ ──┐    │         │ 2 │ ("e", 8) │
//!   └──────┴─────┘   └────┼───────► └───┴──────────┘
//!                         └───────────────▲
//! ```
//!
//! [`FrequencyMatrix`]: super::FrequencyMatrix

use std::collections::HashMap;
use std::hash::Hash;

use crate::error::{ensure_positive, ConstructionResult};
use crate::frequency::exact::ExactCounter;
use crate::traits::{FrequencySource, HeavyHitters};

#[derive(Clone, Debug)]
struct Slot<K> {
    key: K,
    count: u64,
}

/// What [`BoundedTopK::offer`] did with a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OfferOutcome<K> {
    /// The key was already tracked and its count was refreshed
    Updated,
    /// The key took a free slot
    Inserted,
    /// The key replaced the minimum, which was evicted
    Replaced { evicted: K },
    /// The summary is full and the key's count does not beat the minimum
    Rejected,
}

/// Fixed-capacity top-k tracker
///
/// Ties at the minimum keep the incumbent: a new key has to strictly exceed
/// the smallest tracked count to get in.
///
/// # Thread safety
///
/// `offer` takes `&mut self`. Concurrent offers need external
/// serialization, e.g. one summary per shard sharing an
/// `Arc<FrequencyMatrix>` source.
///
/// # Example
///
/// ```
/// use heavy_hitters::frequency::BoundedTopK;
///
/// let mut top = BoundedTopK::exact(2).unwrap();
/// for word in "a b b c c c".split(' ') {
///     top.offer(word);
/// }
///
/// let view = top.top_k();
/// assert_eq!(view.get("c"), Some(&3));
/// assert_eq!(view.get("b"), Some(&2));
/// assert!(!view.contains_key("a"));
/// ```
#[derive(Clone, Debug)]
pub struct BoundedTopK<K, S> {
    capacity: usize,
    source: S,
    heap: Vec<Slot<K>>,
    index: HashMap<K, usize>,
}

impl<K: Hash + Eq + Clone> BoundedTopK<K, ExactCounter<K>> {
    /// Top-k over exact per-key counts
    ///
    /// # Errors
    ///
    /// Returns an error if `capacity` is zero
    pub fn exact(capacity: usize) -> ConstructionResult<Self> {
        Self::new(capacity, ExactCounter::new())
    }
}

impl<K, S> BoundedTopK<K, S>
where
    K: Hash + Eq + Clone,
    S: FrequencySource<K>,
{
    /// Create an empty summary of at most `capacity` keys over `source`
    ///
    /// # Errors
    ///
    /// Returns an error if `capacity` is zero
    pub fn new(capacity: usize, source: S) -> ConstructionResult<Self> {
        let capacity = ensure_positive("capacity", capacity)?;
        Ok(Self {
            capacity,
            source,
            heap: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        })
    }

    /// Record `key` in the source and update the tracked set
    pub fn offer(&mut self, key: K) -> OfferOutcome<K> {
        let count = self.source.record(&key);

        if let Some(&pos) = self.index.get(&key) {
            self.heap[pos].count = count;
            self.fix(pos);
            return OfferOutcome::Updated;
        }

        if self.heap.len() < self.capacity {
            let pos = self.heap.len();
            self.index.insert(key.clone(), pos);
            self.heap.push(Slot { key, count });
            self.sift_up(pos);
            return OfferOutcome::Inserted;
        }

        if count <= self.heap[0].count {
            return OfferOutcome::Rejected;
        }

        // Reuse the root slot for the newcomer
        let root = &mut self.heap[0];
        let evicted = core::mem::replace(&mut root.key, key.clone());
        tracing::trace!(evicted_count = root.count, count, "top-k eviction");
        root.count = count;
        self.index.remove(&evicted);
        self.index.insert(key, 0);
        self.sift_down(0);
        OfferOutcome::Replaced { evicted }
    }

    /// Tracked keys and their counts
    pub fn top_k(&self) -> HashMap<K, u64> {
        self.heap
            .iter()
            .map(|slot| (slot.key.clone(), slot.count))
            .collect()
    }

    /// Tracked keys ordered by descending count
    pub fn sorted(&self) -> Vec<(K, u64)> {
        let mut items: Vec<_> = self
            .heap
            .iter()
            .map(|slot| (slot.key.clone(), slot.count))
            .collect();
        items.sort_by(|a, b| b.1.cmp(&a.1));
        items
    }

    /// Count stored for `key` when it is tracked
    pub fn count(&self, key: &K) -> Option<u64> {
        self.index.get(key).map(|&pos| self.heap[pos].count)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Smallest tracked count, the bar a new key has to clear once full
    pub fn min_count(&self) -> Option<u64> {
        self.heap.first().map(|slot| slot.count)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.heap.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Restore heap order after the count at `pos` changed in either direction
    fn fix(&mut self, pos: usize) {
        if !self.sift_up(pos) {
            self.sift_down(pos);
        }
    }

    /// Returns whether the slot moved
    fn sift_up(&mut self, mut pos: usize) -> bool {
        let start = pos;
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if self.heap[pos].count >= self.heap[parent].count {
                break;
            }
            self.swap(pos, parent);
            pos = parent;
        }
        pos != start
    }

    fn sift_down(&mut self, mut pos: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * pos + 1;
            let right = left + 1;
            let mut smallest = pos;
            if left < len && self.heap[left].count < self.heap[smallest].count {
                smallest = left;
            }
            if right < len && self.heap[right].count < self.heap[smallest].count {
                smallest = right;
            }
            if smallest == pos {
                break;
            }
            self.swap(pos, smallest);
            pos = smallest;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        if let Some(slot) = self.index.get_mut(&self.heap[a].key) {
            *slot = a;
        }
        if let Some(slot) = self.index.get_mut(&self.heap[b].key) {
            *slot = b;
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert!(self.heap.len() <= self.capacity);
        assert_eq!(self.heap.len(), self.index.len());
        for (pos, slot) in self.heap.iter().enumerate() {
            assert_eq!(self.index.get(&slot.key), Some(&pos));
            if pos > 0 {
                assert!(self.heap[(pos - 1) / 2].count <= slot.count);
            }
        }
    }
}

impl<K, S> HeavyHitters<K> for BoundedTopK<K, S>
where
    K: Hash + Eq + Clone,
    S: FrequencySource<K>,
{
    fn process(&mut self, key: K) {
        self.offer(key);
    }

    fn top_k(&self) -> HashMap<K, u64> {
        BoundedTopK::top_k(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::FrequencyMatrix;

    #[test]
    fn test_rejects_zero_capacity() {
        assert!(BoundedTopK::<&str, _>::exact(0).is_err());
    }

    #[test]
    fn test_four_cases() {
        let mut top = BoundedTopK::exact(2).unwrap();

        assert_eq!(top.offer("a"), OfferOutcome::Inserted);
        assert_eq!(top.offer("b"), OfferOutcome::Inserted);
        assert_eq!(top.offer("a"), OfferOutcome::Updated);
        // "c" has count 1, minimum is "b" at 1: tie keeps the incumbent
        assert_eq!(top.offer("c"), OfferOutcome::Rejected);
        // now "c" is at 2 > 1
        assert_eq!(top.offer("c"), OfferOutcome::Replaced { evicted: "b" });

        assert_eq!(top.count(&"a"), Some(2));
        assert_eq!(top.count(&"c"), Some(2));
        assert!(!top.contains(&"b"));
        top.debug_validate_invariants();
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut top = BoundedTopK::exact(5).unwrap();
        for i in 0..1000u32 {
            top.offer(i % 37);
            assert!(top.len() <= 5);
        }
        assert!(top.is_full());
        top.debug_validate_invariants();
    }

    #[test]
    fn test_min_count_tracks_root() {
        let mut top = BoundedTopK::exact(3).unwrap();
        for key in ["x", "x", "x", "y", "y", "z"] {
            top.offer(key);
        }
        assert_eq!(top.min_count(), Some(1));
        top.offer("z");
        top.offer("z");
        top.offer("z");
        assert_eq!(top.min_count(), Some(2));
        top.debug_validate_invariants();
    }

    #[test]
    fn test_sorted() {
        let mut top = BoundedTopK::exact(3).unwrap();
        for _ in 0..5 {
            top.offer("five");
        }
        for _ in 0..2 {
            top.offer("two");
        }
        for _ in 0..9 {
            top.offer("nine");
        }
        assert_eq!(
            top.sorted(),
            vec![("nine", 9), ("five", 5), ("two", 2)]
        );
    }

    #[test]
    fn test_over_matrix() {
        let matrix = FrequencyMatrix::with_accuracy(0.001, 0.001).into_inner();
        let mut top = BoundedTopK::new(3, matrix).unwrap();

        for i in 0..50 {
            for _ in 0..(i % 10) {
                top.offer(format!("item_{}", i));
            }
        }
        for _ in 0..100 {
            top.offer("hot".to_string());
        }

        assert!(top.count(&"hot".to_string()).unwrap() >= 100);
        assert!(top.source().query("hot") >= 100);
        top.debug_validate_invariants();
    }

    #[test]
    fn test_heavy_hitters_trait() {
        fn feed<H: HeavyHitters<&'static str>>(h: &mut H) {
            for w in "a b b c c c".split(' ') {
                h.process(w);
            }
        }
        let mut top = BoundedTopK::exact(1).unwrap();
        feed(&mut top);
        let view = HeavyHitters::top_k(&top);
        assert_eq!(view.len(), 1);
        assert_eq!(view.get("c"), Some(&3));
    }

    #[test]
    fn test_into_source_keeps_counts() {
        let mut top = BoundedTopK::exact(1).unwrap();
        top.offer(1u8);
        top.offer(2u8);
        top.offer(2u8);
        let counts = top.into_source();
        assert_eq!(counts.count(&1), 1);
        assert_eq!(counts.count(&2), 2);
    }
}
