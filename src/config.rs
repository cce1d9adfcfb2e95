//! Accuracy parameters and their validation
//!
//! Both the Count-Min matrix and the stream summary are sized from ratio
//! parameters. A ratio outside `[MIN_RATIO, MAX_RATIO]` is not an error: it is
//! replaced by a default, a warning is logged, and the replacement is recorded
//! in the returned [`Validated`] so callers can inspect it.
//!
//! ```
//! use heavy_hitters::config::{Accuracy, Parameter};
//!
//! let accuracy = Accuracy::new(0.5, 0.01);
//! assert!(accuracy.is_substituted());
//! assert_eq!(accuracy.substitutions()[0].parameter, Parameter::Epsilon);
//! assert_eq!(accuracy.value().epsilon(), 1e-3);
//! ```

use core::fmt;

use crate::math;

/// Smallest accepted ratio
pub const MIN_RATIO: f64 = 1e-9;
/// Largest accepted ratio
pub const MAX_RATIO: f64 = 0.1;
/// Replacement for an out-of-range error ratio (0.1%)
pub const DEFAULT_ERROR_RATIO: f64 = 1e-3;
/// Replacement for an out-of-range failure probability (0.1%)
pub const DEFAULT_UNCERTAINTY: f64 = 1e-3;

/// Ratio parameter subject to range validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parameter {
    /// Error ratio, controls width and capacity
    Epsilon,
    /// Failure probability, controls depth
    Delta,
}

impl Parameter {
    /// Value used when a caller supplies an out-of-range ratio
    pub fn default_value(self) -> f64 {
        match self {
            Parameter::Epsilon => DEFAULT_ERROR_RATIO,
            Parameter::Delta => DEFAULT_UNCERTAINTY,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parameter::Epsilon => f.write_str("error ratio"),
            Parameter::Delta => f.write_str("uncertainty"),
        }
    }
}

/// Record of an out-of-range ratio that was replaced by its default
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Substitution {
    pub parameter: Parameter,
    pub requested: f64,
    pub applied: f64,
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} not in [{}, {}], using default {}",
            self.parameter, self.requested, MIN_RATIO, MAX_RATIO, self.applied
        )
    }
}

/// A value built from validated parameters, plus any substitutions made
#[derive(Debug, Clone)]
pub struct Validated<T> {
    value: T,
    substitutions: Vec<Substitution>,
}

impl<T> Validated<T> {
    fn new(value: T, substitutions: Vec<Substitution>) -> Self {
        Self {
            value,
            substitutions,
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    /// Parameters that were replaced by their defaults
    pub fn substitutions(&self) -> &[Substitution] {
        &self.substitutions
    }

    pub fn is_substituted(&self) -> bool {
        !self.substitutions.is_empty()
    }

    /// Transform the value, keeping the substitution record
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Validated<U> {
        Validated::new(f(self.value), self.substitutions)
    }
}

/// Checks `requested` against `[MIN_RATIO, MAX_RATIO]`.
///
/// NaN is out of range. An out-of-range value is replaced by the parameter's
/// default and logged at warn level.
pub fn validate_ratio(parameter: Parameter, requested: f64) -> Validated<f64> {
    if (MIN_RATIO..=MAX_RATIO).contains(&requested) {
        return Validated::new(requested, Vec::new());
    }

    let applied = parameter.default_value();
    tracing::warn!(
        parameter = %parameter,
        requested,
        applied,
        "ratio not in [{MIN_RATIO}, {MAX_RATIO}], using default"
    );
    Validated::new(
        applied,
        vec![Substitution {
            parameter,
            requested,
            applied,
        }],
    )
}

/// Validated `(epsilon, delta)` pair
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Accuracy {
    epsilon: f64,
    delta: f64,
}

impl Accuracy {
    /// Validate both ratios, substituting defaults where needed
    pub fn new(epsilon: f64, delta: f64) -> Validated<Self> {
        let epsilon = validate_ratio(Parameter::Epsilon, epsilon);
        let delta = validate_ratio(Parameter::Delta, delta);

        let mut substitutions = epsilon.substitutions;
        substitutions.extend(delta.substitutions);

        Validated::new(
            Self {
                epsilon: epsilon.value,
                delta: delta.value,
            },
            substitutions,
        )
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Matrix width, `ceil(2 / epsilon)`
    pub fn width(&self) -> usize {
        math::width_for_epsilon(self.epsilon)
    }

    /// Matrix depth, `ceil(log2(1 / delta))`
    pub fn depth(&self) -> usize {
        math::depth_for_delta(self.delta)
    }

    /// Stream-summary capacity, `ceil(1 / epsilon)`
    pub fn capacity(&self) -> usize {
        math::capacity_for_epsilon(self.epsilon)
    }
}

impl Default for Accuracy {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_ERROR_RATIO,
            delta: DEFAULT_UNCERTAINTY,
        }
    }
}
