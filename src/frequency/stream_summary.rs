//! Stream-Summary for Space-Saving heavy hitters
//!
//! A fixed set of `m` counters grouped into buckets of equal value. Buckets
//! form a doubly linked list ordered by value, so the global minimum is always
//! the tail bucket and an increment only ever moves a counter to the adjacent
//! bucket. Both operations are O(1).
//!
//! ## Architecture
//!
//! ```text
//!   cache: HashMap<K, CounterId>
//!
//!   head (max)                                            tail (min)
//!   ┌───────────────┐  lower  ┌───────────────┐  lower  ┌───────────────┐
//!   │ Bucket val=7  │ ──────► │ Bucket val=5  │ ──────► │ Bucket val=1  │
//!   │  [g]          │ ◄────── │  [e] ─ [f]    │ ◄────── │  [a] ─ [d]    │
//!   └───────────────┘ higher  └───────────────┘ higher  └───────────────┘
//!                                                        front ▲
//!                                               next victim ───┘
//! ```
//!
//! Counters and buckets live in `Vec` arenas and link to each other by index.
//! Emptied buckets go on a free list and are reused. A bucket is only
//! allocated while its source bucket keeps another counter, so at most `m`
//! bucket slots ever exist.
//!
//! ## Guarantees
//!
//! For every tracked item, `value - error <= true_count <= value`. Any item
//! whose true frequency exceeds `offers / m` is tracked.

use std::collections::HashMap;
use std::hash::Hash;

use crate::config::{validate_ratio, Parameter, Validated};
use crate::error::{ensure_positive, ConstructionResult};
use crate::math;
use crate::traits::Estimate;

type CounterId = usize;
type BucketId = usize;

#[derive(Clone, Debug)]
struct CounterNode<K> {
    /// `None` until the counter is first assigned
    item: Option<K>,
    value: u64,
    error: u64,
    bucket: BucketId,
    prev: Option<CounterId>,
    next: Option<CounterId>,
}

#[derive(Clone, Debug)]
struct Bucket {
    value: u64,
    /// Front of the counter list, the next eviction candidate
    front: Option<CounterId>,
    back: Option<CounterId>,
    /// Neighbour toward the head
    higher: Option<BucketId>,
    /// Neighbour toward the tail
    lower: Option<BucketId>,
}

impl Bucket {
    fn new(value: u64) -> Self {
        Self {
            value,
            front: None,
            back: None,
            higher: None,
            lower: None,
        }
    }
}

/// Tracked item as reported by [`StreamSummary::top_k`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Counter<K> {
    pub item: K,
    /// Count attributed to `item`, an upper bound on its true count
    pub value: u64,
    /// Value the counter held for its previous item
    pub error: u64,
}

impl<K> Counter<K> {
    pub fn estimate(&self) -> Estimate {
        Estimate::new(self.value, self.error)
    }
}

/// Space-Saving heavy hitter tracker built on a bucket list
///
/// # Thread safety
///
/// Single writer. [`offer`](Self::offer) takes `&mut self`; run one summary
/// per thread or shard, or serialize access externally.
///
/// # Example
///
/// ```
/// use heavy_hitters::frequency::StreamSummary;
///
/// let mut summary = StreamSummary::new(0.1).into_inner();
/// assert_eq!(summary.capacity(), 10);
///
/// for word in "a b b c c c".split(' ') {
///     summary.offer(word);
/// }
///
/// let top = summary.top_k(1);
/// assert_eq!(top[0].item, "c");
/// assert_eq!(top[0].value, 3);
/// ```
#[derive(Clone, Debug)]
pub struct StreamSummary<K> {
    capacity: usize,
    counters: Vec<CounterNode<K>>,
    buckets: Vec<Bucket>,
    free_buckets: Vec<BucketId>,
    /// Highest-valued bucket
    head: BucketId,
    /// Lowest-valued bucket
    tail: BucketId,
    cache: HashMap<K, CounterId>,
    offers: u64,
}

impl<K: Hash + Eq + Clone> StreamSummary<K> {
    /// Create a summary with `ceil(1 / epsilon)` counters
    ///
    /// `epsilon` must lie in `[1e-9, 0.1]`; anything else is replaced by
    /// `1e-3` with a logged warning and recorded in the result.
    pub fn new(epsilon: f64) -> Validated<Self> {
        validate_ratio(Parameter::Epsilon, epsilon)
            .map(|epsilon| Self::build(math::capacity_for_epsilon(epsilon)))
    }

    /// Create a summary with exactly `capacity` counters
    ///
    /// # Errors
    ///
    /// Returns an error if `capacity` is zero
    pub fn with_capacity(capacity: usize) -> ConstructionResult<Self> {
        ensure_positive("capacity", capacity).map(Self::build)
    }

    fn build(capacity: usize) -> Self {
        tracing::debug!(capacity, "allocating stream summary");

        let counters = (0..capacity)
            .map(|id| CounterNode {
                item: None,
                value: 0,
                error: 0,
                bucket: 0,
                prev: id.checked_sub(1),
                next: if id + 1 < capacity { Some(id + 1) } else { None },
            })
            .collect();

        let mut zero = Bucket::new(0);
        zero.front = Some(0);
        zero.back = Some(capacity - 1);

        let mut buckets = Vec::with_capacity(capacity);
        buckets.push(zero);

        Self {
            capacity,
            counters,
            buckets,
            free_buckets: Vec::new(),
            head: 0,
            tail: 0,
            cache: HashMap::with_capacity(capacity),
            offers: 0,
        }
    }

    /// Record one occurrence of `item`
    pub fn offer(&mut self, item: K) {
        self.offers += 1;

        if let Some(&id) = self.cache.get(&item) {
            self.increment(id);
            return;
        }

        // Cache miss: take over the front counter of the minimum bucket
        let Some(id) = self.buckets[self.tail].front else {
            return;
        };
        let counter = &mut self.counters[id];
        let previous = counter.item.replace(item.clone());
        counter.error = counter.value;
        if let Some(previous) = previous {
            tracing::trace!(error = counter.error, "stream summary counter reassigned");
            self.cache.remove(&previous);
        }
        self.cache.insert(item, id);
        self.increment(id);
    }

    /// Up to `k` tracked items, highest value first
    ///
    /// Items that share a value come out in bucket order, which is
    /// deterministic but otherwise unspecified.
    pub fn top_k(&self, k: usize) -> Vec<Counter<K>> {
        self.iter().take(k).collect()
    }

    /// Items whose value exceeds `phi * offers`, highest value first
    ///
    /// With `phi >= 1 / capacity` every item whose true frequency exceeds
    /// `phi * offers` is included.
    pub fn heavy_hitters(&self, phi: f64) -> Vec<Counter<K>> {
        let threshold = phi * self.offers as f64;
        self.iter()
            .take_while(|c| c.value as f64 > threshold)
            .collect()
    }

    /// Tracked items in descending value order
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            summary: self,
            bucket: Some(self.head),
            counter: self.buckets[self.head].front,
        }
    }

    /// Value and error for `item` if it is tracked
    pub fn estimate(&self, item: &K) -> Option<Estimate> {
        self.cache.get(item).map(|&id| {
            let c = &self.counters[id];
            Estimate::new(c.value, c.error)
        })
    }

    /// Guaranteed minimum count for `item`, zero if untracked
    pub fn guaranteed(&self, item: &K) -> u64 {
        self.estimate(item).map_or(0, |e| e.lower_bound())
    }

    pub fn contains(&self, item: &K) -> bool {
        self.cache.contains_key(item)
    }

    /// Number of counters
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of distinct items currently tracked
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Number of offers since construction or the last clear
    pub fn offers(&self) -> u64 {
        self.offers
    }

    /// Smallest counter value, the error a newly admitted item would take on
    pub fn min_value(&self) -> u64 {
        self.buckets[self.tail].value
    }

    /// Reset to the freshly constructed state
    pub fn clear(&mut self) {
        *self = Self::build(self.capacity);
    }

    /// Bump counter `id` by one and move it to the matching bucket
    fn increment(&mut self, id: CounterId) {
        let source = self.counters[id].bucket;
        let value = self.counters[id].value + 1;
        self.counters[id].value = value;

        let higher = self.buckets[source].higher;
        if let Some(target) = higher.filter(|&h| self.buckets[h].value == value) {
            self.unlink_counter(id);
            self.push_back(target, id);
            if self.buckets[source].front.is_none() {
                self.remove_bucket(source);
            }
            return;
        }

        // Sole member: the bucket moves up with its counter. The next higher
        // bucket is at least `value + 1`, so the order still holds.
        let bucket = &self.buckets[source];
        if bucket.front == Some(id) && bucket.back == Some(id) {
            self.buckets[source].value = value;
            return;
        }

        self.unlink_counter(id);
        let target = self.insert_bucket_above(source, value);
        self.push_back(target, id);
    }

    fn unlink_counter(&mut self, id: CounterId) {
        let CounterNode {
            bucket, prev, next, ..
        } = self.counters[id];
        match prev {
            Some(p) => self.counters[p].next = next,
            None => self.buckets[bucket].front = next,
        }
        match next {
            Some(n) => self.counters[n].prev = prev,
            None => self.buckets[bucket].back = prev,
        }
        self.counters[id].prev = None;
        self.counters[id].next = None;
    }

    fn push_back(&mut self, bucket: BucketId, id: CounterId) {
        let back = self.buckets[bucket].back;
        {
            let counter = &mut self.counters[id];
            counter.bucket = bucket;
            counter.prev = back;
            counter.next = None;
        }
        match back {
            Some(b) => self.counters[b].next = Some(id),
            None => self.buckets[bucket].front = Some(id),
        }
        self.buckets[bucket].back = Some(id);
    }

    /// Link a new empty bucket with `value` directly above `below`
    fn insert_bucket_above(&mut self, below: BucketId, value: u64) -> BucketId {
        let above = self.buckets[below].higher;
        let mut bucket = Bucket::new(value);
        bucket.lower = Some(below);
        bucket.higher = above;

        let id = match self.free_buckets.pop() {
            Some(id) => {
                self.buckets[id] = bucket;
                id
            }
            None => {
                self.buckets.push(bucket);
                self.buckets.len() - 1
            }
        };

        self.buckets[below].higher = Some(id);
        match above {
            Some(a) => self.buckets[a].lower = Some(id),
            None => self.head = id,
        }
        id
    }

    /// Unlink an empty bucket and recycle its slot
    fn remove_bucket(&mut self, id: BucketId) {
        let Bucket { higher, lower, .. } = self.buckets[id];
        match higher {
            Some(h) => self.buckets[h].lower = lower,
            None => {
                if let Some(l) = lower {
                    self.head = l;
                }
            }
        }
        match lower {
            Some(l) => self.buckets[l].higher = higher,
            None => {
                if let Some(h) = higher {
                    self.tail = h;
                }
            }
        }
        self.buckets[id].higher = None;
        self.buckets[id].lower = None;
        self.free_buckets.push(id);
    }

    /// Panics if the bucket list or the cache is inconsistent
    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.counters.len(), self.capacity);
        assert!(self.cache.len() <= self.capacity);
        assert!(self.buckets[self.head].higher.is_none());
        assert!(self.buckets[self.tail].lower.is_none());

        let mut seen = 0usize;
        let mut bucket = Some(self.tail);
        let mut last_value: Option<u64> = None;
        let mut last_bucket: Option<BucketId> = None;

        while let Some(b) = bucket {
            let current = &self.buckets[b];
            assert!(!self.free_buckets.contains(&b));
            assert_eq!(current.lower, last_bucket);
            if let Some(v) = last_value {
                assert!(current.value > v, "bucket values must strictly increase");
            }
            assert!(current.front.is_some(), "bucket {} is empty", b);

            let mut counter = current.front;
            let mut prev = None;
            while let Some(c) = counter {
                let node = &self.counters[c];
                assert_eq!(node.bucket, b);
                assert_eq!(node.value, current.value);
                assert_eq!(node.prev, prev);
                assert!(node.error <= node.value);
                if let Some(item) = &node.item {
                    assert_eq!(self.cache.get(item), Some(&c));
                }
                prev = counter;
                counter = node.next;
                seen += 1;
            }
            assert_eq!(current.back, prev);

            last_value = Some(current.value);
            last_bucket = Some(b);
            bucket = current.higher;
        }

        assert_eq!(last_bucket, Some(self.head));
        assert_eq!(seen, self.capacity);
        assert!(self.buckets.len() - self.free_buckets.len() <= self.capacity);
    }
}

/// Iterator over tracked items, see [`StreamSummary::iter`]
pub struct Iter<'a, K> {
    summary: &'a StreamSummary<K>,
    bucket: Option<BucketId>,
    counter: Option<CounterId>,
}

impl<K: Clone> Iterator for Iter<'_, K> {
    type Item = Counter<K>;

    fn next(&mut self) -> Option<Counter<K>> {
        loop {
            match self.counter {
                Some(id) => {
                    let node = &self.summary.counters[id];
                    self.counter = node.next;
                    if let Some(item) = &node.item {
                        return Some(Counter {
                            item: item.clone(),
                            value: node.value,
                            error: node.error,
                        });
                    }
                }
                None => {
                    let lower = self.summary.buckets[self.bucket?].lower;
                    self.bucket = lower;
                    self.counter = self.summary.buckets[lower?].front;
                }
            }
        }
    }
}
