//! Construction errors
//!
//! Ratio parameters that fall outside their valid range are corrected in
//! place (see [`crate::config`]); only structurally impossible shapes are
//! reported as errors.

use thiserror::Error;

/// Error returned when a structure cannot be built with the requested shape
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    /// A dimension or capacity was zero
    #[error("{parameter} must be positive, got {value}")]
    NonPositive {
        parameter: &'static str,
        value: usize,
    },

    /// The counter table would not fit in the address space
    #[error("matrix of {width}x{depth} counters is too large")]
    TooLarge { width: usize, depth: usize },
}

impl ConstructionError {
    pub(crate) fn non_positive(parameter: &'static str, value: usize) -> Self {
        ConstructionError::NonPositive { parameter, value }
    }
}

pub type ConstructionResult<T> = Result<T, ConstructionError>;

/// Rejects a zero `value` for the named parameter.
pub(crate) fn ensure_positive(parameter: &'static str, value: usize) -> ConstructionResult<usize> {
    if value == 0 {
        Err(ConstructionError::non_positive(parameter, value))
    } else {
        Ok(value)
    }
}
