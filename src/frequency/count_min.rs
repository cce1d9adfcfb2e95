//! Count-Min Sketch frequency matrix
//!
//! A `depth x width` matrix of counters. Every key maps to one counter per
//! row via [`HashPositioner`]; adding increments those counters and the
//! estimate is the smallest of them. Collisions can only inflate a counter, so
//! the estimate never falls below the true count.

use parking_lot::RwLock;

use crate::config::{Accuracy, Validated};
use crate::error::{ensure_positive, ConstructionError, ConstructionResult};
use crate::frequency::positioner::HashPositioner;

/// Validated matrix shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Dimensions {
    width: usize,
    depth: usize,
}

impl Dimensions {
    /// # Errors
    ///
    /// Returns an error if either side is zero or the cell count overflows
    pub fn new(width: usize, depth: usize) -> ConstructionResult<Self> {
        let width = ensure_positive("width", width)?;
        let depth = ensure_positive("depth", depth)?;
        if width.checked_mul(depth).is_none() {
            return Err(ConstructionError::TooLarge { width, depth });
        }
        Ok(Self { width, depth })
    }

    fn from_accuracy(accuracy: &Accuracy) -> Self {
        Self {
            width: accuracy.width(),
            depth: accuracy.depth(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Total number of counters
    pub fn cells(&self) -> usize {
        self.width * self.depth
    }
}

#[derive(Clone, Debug)]
struct Table {
    /// Row-major counters, `depth * width`
    cells: Vec<u64>,
    /// Sum of all added amounts
    total: u64,
}

/// Count-Min Sketch for frequency estimation
///
/// - Point query: `true_count <= estimate`
/// - With `width = ceil(2 / epsilon)`, the overcount exceeds
///   `epsilon * total` with probability at most `delta`, where
///   `depth = ceil(log2(1 / delta))`
///
/// # Thread safety
///
/// All methods take `&self`. A single reader/writer lock guards the matrix:
/// [`add`](Self::add) and [`clear`](Self::clear) are exclusive, while
/// [`query`](Self::query) calls share access with each other. A query never
/// sees an add that has updated only some of its rows.
///
/// # Example
///
/// ```
/// use heavy_hitters::frequency::FrequencyMatrix;
///
/// let cms = FrequencyMatrix::with_accuracy(0.01, 0.01).into_inner();
/// assert_eq!((cms.width(), cms.depth()), (200, 7));
///
/// cms.add("apple", 5);
/// cms.increment("banana");
/// cms.add("apple", 2);
///
/// assert!(cms.query("apple") >= 7);
/// assert!(cms.query("banana") >= 1);
/// ```
#[derive(Debug)]
pub struct FrequencyMatrix {
    positioner: HashPositioner,
    table: RwLock<Table>,
}

impl FrequencyMatrix {
    /// Create a zeroed matrix with explicit dimensions
    ///
    /// # Errors
    ///
    /// Returns an error if `width` or `depth` is zero
    pub fn new(width: usize, depth: usize) -> ConstructionResult<Self> {
        Dimensions::new(width, depth).map(Self::with_dimensions)
    }

    /// Create a zeroed matrix from a validated shape
    pub fn with_dimensions(dims: Dimensions) -> Self {
        tracing::debug!(
            width = dims.width,
            depth = dims.depth,
            "allocating frequency matrix"
        );
        Self {
            positioner: HashPositioner {
                width: dims.width,
                depth: dims.depth,
            },
            table: RwLock::new(Table {
                cells: vec![0; dims.cells()],
                total: 0,
            }),
        }
    }

    /// Create a matrix sized for the error ratio `epsilon` and failure
    /// probability `delta`
    ///
    /// Out-of-range ratios are replaced by their defaults; see
    /// [`sizing`](Self::sizing).
    pub fn with_accuracy(epsilon: f64, delta: f64) -> Validated<Self> {
        Self::sizing(epsilon, delta).map(Self::with_dimensions)
    }

    /// Dimensions for `epsilon` and `delta`
    ///
    /// `width = ceil(2 / epsilon)` and `depth = ceil(log2(1 / delta))`. Both
    /// ratios must lie in `[1e-9, 0.1]`; anything else is replaced by `1e-3`
    /// with a logged warning and recorded in the result.
    pub fn sizing(epsilon: f64, delta: f64) -> Validated<Dimensions> {
        Accuracy::new(epsilon, delta).map(|accuracy| Dimensions::from_accuracy(&accuracy))
    }

    /// Get the width of each row
    pub fn width(&self) -> usize {
        self.positioner.width()
    }

    /// Get the number of rows
    pub fn depth(&self) -> usize {
        self.positioner.depth()
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width(),
            depth: self.depth(),
        }
    }

    /// Add `amount` to `key` and return its new estimate
    ///
    /// The returned value is the minimum over rows of the counters after
    /// they were incremented.
    pub fn add<K: AsRef<[u8]> + ?Sized>(&self, key: &K, amount: u64) -> u64 {
        let width = self.width();
        let mut table = self.table.write();
        table.total = table.total.saturating_add(amount);

        let mut min_count = u64::MAX;
        for (row, col) in self.positioner.positions(key.as_ref()).enumerate() {
            let cell = &mut table.cells[row * width + col];
            *cell = cell.saturating_add(amount);
            min_count = min_count.min(*cell);
        }
        min_count
    }

    /// Add one occurrence of `key`
    pub fn increment<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> u64 {
        self.add(key, 1)
    }

    /// Estimate the frequency of `key`
    pub fn query<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> u64 {
        let width = self.width();
        let table = self.table.read();
        self.positioner
            .positions(key.as_ref())
            .enumerate()
            .map(|(row, col)| table.cells[row * width + col])
            .min()
            .unwrap_or(0)
    }

    /// Zero every counter
    pub fn clear(&self) {
        let mut table = self.table.write();
        table.cells.fill(0);
        table.total = 0;
    }

    /// Sum of all amounts added since construction or the last clear
    pub fn total(&self) -> u64 {
        self.table.read().total
    }

    /// Overcount that holds with probability `1 - delta`: `(2 / width) * total`
    pub fn error_bound(&self) -> u64 {
        let epsilon = 2.0 / self.width() as f64;
        (epsilon * self.total() as f64) as u64
    }

    /// Memory usage in bytes
    pub fn size_bytes(&self) -> usize {
        core::mem::size_of::<Self>() + self.width() * self.depth() * core::mem::size_of::<u64>()
    }
}

impl Clone for FrequencyMatrix {
    fn clone(&self) -> Self {
        Self {
            positioner: self.positioner,
            table: RwLock::new(self.table.read().clone()),
        }
    }
}
