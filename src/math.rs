//! Sizing formulas shared by the sketches
//!
//! Inputs are expected to be already validated ratios in `[1e-9, 0.1]`, which
//! keeps every result positive and well inside `usize`.

/// Counters per matrix row: `ceil(2 / epsilon)`
#[inline]
pub fn width_for_epsilon(epsilon: f64) -> usize {
    (2.0 / epsilon).ceil() as usize
}

/// Matrix rows: `ceil(log2(1 / delta))`
#[inline]
pub fn depth_for_delta(delta: f64) -> usize {
    (1.0 / delta).log2().ceil() as usize
}

/// Stream-summary counters: `ceil(1 / epsilon)`
#[inline]
pub fn capacity_for_epsilon(epsilon: f64) -> usize {
    (1.0 / epsilon).ceil() as usize
}
