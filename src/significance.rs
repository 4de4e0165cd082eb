//! Binomial significance bound on per-bit mutual information.
//!
//! With `n` observations of a fair coin, the empirical frequency of one
//! outcome stays within `0.5 ± z/(2√n)` at the requested confidence. The
//! information implied by that worst-case bias is the largest mutual
//! information that finite-sample noise can produce; anything at or below
//! it is indistinguishable from zero.

use crate::error::{check_unit_open, BitRoundError};
use crate::special::inverse_normal_cdf;

/// Confidence level used when the caller does not pick one.
pub const DEFAULT_CONFIDENCE: f64 = 0.99;

/// Upper bound of the two-sided binomial confidence interval around 0.5.
///
/// Clamped to at most `1.0`, so tiny samples saturate instead of erroring.
pub fn binom_confidence(n: usize, confidence: f64) -> Result<f64, BitRoundError> {
    check_unit_open("confidence", confidence)?;

    let v = 1.0 - (1.0 - confidence) * 0.5;
    let p = 0.5 + inverse_normal_cdf(v) / (2.0 * (n as f64).sqrt());
    Ok(p.min(1.0))
}

/// Entropy in bits of a two-outcome distribution.
///
/// Zero-probability outcomes contribute nothing.
pub fn entropy2(p: f64, q: f64) -> f64 {
    let mut h = 0.0;
    if p > 0.0 {
        h -= p * p.ln();
    }
    if q > 0.0 {
        h -= q * q.ln();
    }
    h / std::f64::consts::LN_2
}

/// Largest mutual information (bits) explainable by sampling noise alone.
///
/// # Example
/// ```
/// use bitround_rs::significance::free_entropy_bound;
///
/// let small = free_entropy_bound(100, 0.99).unwrap();
/// let large = free_entropy_bound(1_000_000, 0.99).unwrap();
/// assert!(large < small);
/// ```
pub fn free_entropy_bound(n: usize, confidence: f64) -> Result<f64, BitRoundError> {
    let p = binom_confidence(n, confidence)?;
    Ok(1.0 - entropy2(p, 1.0 - p))
}
