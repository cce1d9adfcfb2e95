//! Frequency estimation and heavy hitter algorithms
//!
//! # Algorithms
//!
//! - [`FrequencyMatrix`]: Count-Min Sketch with double-hashed rows
//! - [`BoundedTopK`]: size-capped min-heap over any [`FrequencySource`]
//! - [`StreamSummary`]: Space-Saving with O(1) bucket-list updates and
//!   per-item error bounds
//! - [`MisraGries`]: decrement-all baseline
//! - [`ExactCounter`]: one counter per key
//!
//! The matrix and the stream summary are alternatives: feed a key to a
//! `BoundedTopK<_, FrequencyMatrix>` or to a `StreamSummary`, not both.
//!
//! # Example
//!
//! ```
//! use heavy_hitters::frequency::{BoundedTopK, FrequencyMatrix};
//!
//! let matrix = FrequencyMatrix::with_accuracy(0.001, 0.01).into_inner();
//! let mut top = BoundedTopK::new(2, matrix).unwrap();
//!
//! for word in "x y y z z z".split(' ') {
//!     top.offer(word);
//! }
//!
//! let view = top.top_k();
//! assert!(view["z"] >= 3);
//! assert!(view["y"] >= 2);
//! ```
//!
//! [`FrequencySource`]: crate::traits::FrequencySource

mod count_min;
mod exact;
mod misra_gries;
mod positioner;
mod stream_summary;
mod top_k;

pub use count_min::{Dimensions, FrequencyMatrix};
pub use exact::ExactCounter;
pub use misra_gries::MisraGries;
pub use positioner::{base_hashes, HashPositioner, Positions};
pub use stream_summary::{Counter, Iter, StreamSummary};
pub use top_k::{BoundedTopK, OfferOutcome};
