//! # heavy-hitters
//!
//! Bounded-memory heavy hitter detection for data streams.
//!
//! Finds which keys occur most often in a stream, and roughly how often,
//! without keeping a counter per distinct key. Intended for stream
//! processors, rate limiters and cache admission filters.
//!
//! ## Structures
//!
//! - **Count-Min Sketch** ([`FrequencyMatrix`]): thread-safe `depth x width`
//!   counter matrix, never underestimates
//! - **Bounded top-k** ([`BoundedTopK`]): keeps the `k` largest counts from
//!   any [`FrequencySource`](traits::FrequencySource)
//! - **Stream-Summary** ([`StreamSummary`]): Space-Saving counters in a
//!   bucket list, O(1) per update with a per-item error bound
//!
//! ## Quick Start
//!
//! ```rust
//! use heavy_hitters::prelude::*;
//!
//! let mut summary = StreamSummary::new(0.01).into_inner();
//! for user in ["alice", "bob", "alice", "carol", "alice"] {
//!     summary.offer(user);
//! }
//!
//! let top = summary.top_k(1);
//! assert_eq!(top[0].item, "alice");
//! assert_eq!(top[0].value, 3);
//! ```
//!
//! ## Accuracy parameters
//!
//! Structures sized from `epsilon` (error ratio) and `delta` (failure
//! probability) accept values in `[1e-9, 0.1]`. Anything else is replaced by
//! `1e-3`; the replacement is logged through `tracing` and reported by the
//! returned [`Validated`](config::Validated):
//!
//! ```rust
//! use heavy_hitters::frequency::FrequencyMatrix;
//!
//! let sized = FrequencyMatrix::sizing(0.5, 0.01);
//! assert!(sized.is_substituted());
//! assert_eq!(sized.value().width(), 2000);
//! ```
//!
//! ## Concurrency
//!
//! Only [`FrequencyMatrix`] is safe to share across threads. The other
//! structures are single-writer; give each thread or shard its own instance.
//!
//! ## Feature Flags
//!
//! - `serde`: `Serialize` for result types

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod error;
pub mod frequency;
pub mod math;
pub mod traits;

pub mod prelude {
    pub use crate::config::{Accuracy, Validated};
    pub use crate::error::{ConstructionError, ConstructionResult};
    pub use crate::frequency::{
        BoundedTopK, Counter, ExactCounter, FrequencyMatrix, MisraGries, OfferOutcome,
        StreamSummary,
    };
    pub use crate::traits::*;
}

pub use error::{ConstructionError, ConstructionResult};
pub use frequency::{BoundedTopK, FrequencyMatrix, StreamSummary};
