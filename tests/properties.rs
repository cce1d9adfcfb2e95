//! Property tests for the heavy hitter structures
//!
//! Run with: cargo test --test properties

use std::collections::HashMap;

use heavy_hitters::frequency::{BoundedTopK, FrequencyMatrix, OfferOutcome, StreamSummary};
use proptest::prelude::*;

/// Small alphabet so that streams repeat keys often
fn stream(max_len: usize) -> impl Strategy<Value = Vec<u16>> {
    prop::collection::vec(0u16..64, 0..max_len)
}

fn counts(items: &[u16]) -> HashMap<u16, u64> {
    let mut truth = HashMap::new();
    for &item in items {
        *truth.entry(item).or_insert(0u64) += 1;
    }
    truth
}

#[cfg(debug_assertions)]
fn check_summary(summary: &StreamSummary<u16>) {
    summary.debug_validate_invariants();
}

#[cfg(not(debug_assertions))]
fn check_summary(_: &StreamSummary<u16>) {}

#[cfg(debug_assertions)]
fn check_top_k<S>(top: &BoundedTopK<u16, S>)
where
    S: heavy_hitters::traits::FrequencySource<u16>,
{
    top.debug_validate_invariants();
}

#[cfg(not(debug_assertions))]
fn check_top_k<S>(_: &BoundedTopK<u16, S>) {}

// =============================================================================
// Count-Min Sketch
// =============================================================================

proptest! {
    /// Property: estimate(x) >= true count of x
    #[cfg_attr(miri, ignore)]
    #[test]
    fn prop_matrix_never_underestimates(
        items in stream(400),
        width in 1usize..32,
        depth in 1usize..6
    ) {
        let cms = FrequencyMatrix::new(width, depth).unwrap();
        for item in &items {
            cms.increment(&item.to_le_bytes());
        }

        for (item, count) in counts(&items) {
            prop_assert!(cms.query(&item.to_le_bytes()) >= count);
        }
        prop_assert_eq!(cms.total(), items.len() as u64);
    }

    /// Property: add returns the post-update estimate
    #[cfg_attr(miri, ignore)]
    #[test]
    fn prop_matrix_add_returns_query(
        items in prop::collection::vec((0u16..64, 1u64..10), 1..100)
    ) {
        let cms = FrequencyMatrix::new(16, 3).unwrap();
        for (item, amount) in items {
            let key = item.to_le_bytes();
            let returned = cms.add(&key, amount);
            prop_assert_eq!(returned, cms.query(&key));
        }
    }
}

// =============================================================================
// Bounded top-k
// =============================================================================

proptest! {
    /// Property: heap and index stay consistent and size stays bounded
    #[cfg_attr(miri, ignore)]
    #[test]
    fn prop_top_k_invariants_hold(items in stream(300), capacity in 1usize..8) {
        let mut top = BoundedTopK::exact(capacity).unwrap();
        for item in items {
            top.offer(item);
            check_top_k(&top);
            prop_assert!(top.len() <= capacity);
        }
    }

    /// Property: with exact counts, no untracked key outcounts the tracked minimum
    #[cfg_attr(miri, ignore)]
    #[test]
    fn prop_top_k_keeps_largest(items in stream(300), capacity in 1usize..8) {
        let mut top = BoundedTopK::exact(capacity).unwrap();
        for &item in &items {
            top.offer(item);
        }

        let truth = counts(&items);
        if let Some(min) = top.min_count() {
            for (item, count) in &truth {
                if !top.contains(item) {
                    prop_assert!(*count <= min);
                }
            }
        }
        for (item, count) in top.top_k() {
            prop_assert_eq!(count, truth[&item]);
        }
    }

    /// Property: the tracked minimum never decreases
    #[cfg_attr(miri, ignore)]
    #[test]
    fn prop_top_k_minimum_is_monotonic(items in stream(300), capacity in 1usize..6) {
        let mut top = BoundedTopK::exact(capacity).unwrap();
        let mut last_full_min = 0u64;
        for item in items {
            let outcome = top.offer(item);
            if let OfferOutcome::Rejected = outcome {
                prop_assert!(top.is_full());
            }
            if top.is_full() {
                let min = top.min_count().unwrap();
                prop_assert!(min >= last_full_min);
                last_full_min = min;
            }
        }
    }
}

// =============================================================================
// Stream-Summary
// =============================================================================

proptest! {
    /// Property: bucket list invariants hold after every offer
    #[cfg_attr(miri, ignore)]
    #[test]
    fn prop_summary_invariants_hold(items in stream(300), capacity in 1usize..10) {
        let mut summary = StreamSummary::with_capacity(capacity).unwrap();
        for item in items {
            summary.offer(item);
            check_summary(&summary);
        }
    }

    /// Property: value - error <= true count <= value for every tracked item
    #[cfg_attr(miri, ignore)]
    #[test]
    fn prop_summary_bounds_bracket_truth(items in stream(400), capacity in 1usize..10) {
        let mut summary = StreamSummary::with_capacity(capacity).unwrap();
        for &item in &items {
            summary.offer(item);
        }

        let truth = counts(&items);
        let mut total = 0u64;
        for counter in summary.iter() {
            let t = truth[&counter.item];
            prop_assert!(counter.value >= t);
            prop_assert!(counter.value - counter.error <= t);
            total += counter.value;
        }
        // every offer lands in exactly one counter
        prop_assert_eq!(total, items.len() as u64);
    }

    /// Property: any item with count > n / m is tracked
    #[cfg_attr(miri, ignore)]
    #[test]
    fn prop_summary_tracks_heavy_hitters(items in stream(400), capacity in 1usize..10) {
        let mut summary = StreamSummary::with_capacity(capacity).unwrap();
        for &item in &items {
            summary.offer(item);
        }

        let n = items.len() as u64;
        let m = capacity as u64;
        for (item, count) in counts(&items) {
            if count * m > n {
                prop_assert!(summary.contains(&item));
            }
        }
    }

    /// Property: iteration is ordered by value, highest first
    #[cfg_attr(miri, ignore)]
    #[test]
    fn prop_summary_iter_descending(items in stream(200), capacity in 1usize..10) {
        let mut summary = StreamSummary::with_capacity(capacity).unwrap();
        for item in items {
            summary.offer(item);
        }

        let values: Vec<u64> = summary.iter().map(|c| c.value).collect();
        prop_assert!(values.windows(2).all(|w| w[0] >= w[1]));
        prop_assert!(values.len() <= capacity);
    }

    /// Property: the same stream always yields the same summary
    #[cfg_attr(miri, ignore)]
    #[test]
    fn prop_summary_deterministic(items in stream(200), capacity in 1usize..10) {
        let mut a = StreamSummary::with_capacity(capacity).unwrap();
        let mut b = StreamSummary::with_capacity(capacity).unwrap();
        for &item in &items {
            a.offer(item);
            b.offer(item);
        }
        prop_assert_eq!(a.top_k(capacity), b.top_k(capacity));
    }
}
