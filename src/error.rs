//! Error types for bit-information analysis and rounding.

use thiserror::Error;

/// Errors that can occur while analyzing or rounding float buffers.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BitRoundError {
    /// A parameter was outside its valid domain.
    #[error("invalid argument {name} = {value}: {reason}")]
    InvalidArgument {
        /// Name of the offending parameter.
        name: &'static str,
        /// The value that was supplied.
        value: f64,
        /// The constraint that was violated.
        reason: &'static str,
    },

    /// An iterative special-function solver failed to converge.
    #[error("{solver} did not converge after {iterations} iterations (a={a}, x={x})")]
    NumericalDivergence {
        /// The solver that hit its iteration cap.
        solver: &'static str,
        /// Shape parameter of the incomplete gamma function.
        a: f64,
        /// Integration limit of the incomplete gamma function.
        x: f64,
        /// The iteration cap that was exceeded.
        iterations: usize,
    },

    /// The number of mantissa bits to keep is outside 1..=23.
    #[error("keep-bits {0} outside 1..=23")]
    InvalidKeepBits(u32),
}

impl BitRoundError {
    pub(crate) fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        BitRoundError::InvalidArgument {
            name,
            value,
            reason,
        }
    }
}

/// Check that `value` lies in the open unit interval.
pub(crate) fn check_unit_open(name: &'static str, value: f64) -> Result<(), BitRoundError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(BitRoundError::invalid(name, value, "must lie in (0, 1)"))
    }
}
