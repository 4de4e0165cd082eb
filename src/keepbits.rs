//! Keep-bits decision: how many mantissa bits carry real information.
//!
//! Every strategy first removes positions whose information is within the
//! binomial noise bound, then selects the smallest mantissa width whose
//! cumulative information exceeds the requested retention level.

use std::fmt;

use crate::bitinfo::InformationCurve;
use crate::error::{check_unit_open, BitRoundError};
use crate::layout::{MANTISSA_BITS, NBITS, NON_MANTISSA_BITS};

/// Running-minimum multiplier of the monotonic strategy.
const MONOTONIC_JUMP_FACTOR: f64 = 1.5;

/// Number of jumps above the running minimum the monotonic strategy tolerates.
const MONOTONIC_MAX_JUMPS: usize = 2;

/// Number of most significant mantissa bits to retain, in `1..=23`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeepBits(u8);

impl KeepBits {
    /// Smallest allowed value.
    pub const MIN: KeepBits = KeepBits(1);

    /// Keep the whole mantissa; rounding becomes a no-op.
    pub const FULL: KeepBits = KeepBits(MANTISSA_BITS as u8);

    /// Create a keep-bits count, rejecting values outside `1..=23`.
    pub fn new(bits: u32) -> Result<Self, BitRoundError> {
        if (1..=MANTISSA_BITS as u32).contains(&bits) {
            Ok(KeepBits(bits as u8))
        } else {
            Err(BitRoundError::InvalidKeepBits(bits))
        }
    }

    /// Clamp an arbitrary (possibly negative) count into `1..=23`.
    pub fn clamped(bits: i64) -> Self {
        KeepBits(bits.clamp(1, MANTISSA_BITS as i64) as u8)
    }

    /// Keep-bits implied by the first bit position (0 = sign) to retain.
    fn from_position(position: usize) -> Self {
        KeepBits::clamped(position as i64 + 1 - NON_MANTISSA_BITS as i64)
    }

    /// The count as a plain integer.
    #[inline]
    pub fn get(self) -> u32 {
        self.0 as u32
    }

    /// Number of low mantissa bits that rounding clears.
    #[inline]
    pub fn dropped(self) -> u32 {
        MANTISSA_BITS as u32 - self.0 as u32
    }
}

impl Default for KeepBits {
    fn default() -> Self {
        KeepBits::FULL
    }
}

impl fmt::Display for KeepBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for KeepBits {
    type Error = BitRoundError;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        KeepBits::new(bits)
    }
}

/// How the significance-filtered curve is turned into a keep-bits count.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KeepBitsStrategy {
    /// Remove residual low-bit structure with a 1.5× noise floor, then take
    /// the first position whose cumulative share exceeds `inflevel`.
    #[default]
    InformationThreshold,

    /// Keep sign and exponent information; in the mantissa, zero everything
    /// from the third jump above 1.5× the running minimum onwards, then
    /// apply the `inflevel` threshold.
    Monotonic,

    /// Stop at the first mantissa position whose CDF gradient is below
    /// `tolerance` once the retained information reaches `inflevel` of the
    /// total.
    Gradient {
        /// Gradient below which the CDF is considered flat.
        tolerance: f64,
    },
}

impl fmt::Display for KeepBitsStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeepBitsStrategy::InformationThreshold => write!(f, "information-threshold"),
            KeepBitsStrategy::Monotonic => write!(f, "monotonic"),
            KeepBitsStrategy::Gradient { tolerance } => write!(f, "gradient(tol={})", tolerance),
        }
    }
}

impl KeepBitsStrategy {
    /// Reject a NaN or negative gradient tolerance.
    pub fn validate(&self) -> Result<(), BitRoundError> {
        if let KeepBitsStrategy::Gradient { tolerance } = *self {
            if tolerance.is_nan() || tolerance < 0.0 {
                return Err(BitRoundError::invalid(
                    "tolerance",
                    tolerance,
                    "must be >= 0",
                ));
            }
        }
        Ok(())
    }

    /// Select keep-bits from an already significance-filtered curve.
    ///
    /// `inflevel` must lie in `(0, 1)`. A curve without information yields
    /// [`KeepBits::FULL`].
    pub fn select(
        &self,
        filtered: &InformationCurve,
        inflevel: f64,
    ) -> Result<KeepBits, BitRoundError> {
        check_unit_open("inflevel", inflevel)?;
        self.validate()?;

        let keep = match *self {
            KeepBitsStrategy::InformationThreshold => {
                threshold_keep_bits(&filtered.noise_floor_filtered(), inflevel)
            }
            KeepBitsStrategy::Monotonic => {
                threshold_keep_bits(&monotonic_filtered(filtered), inflevel)
            }
            KeepBitsStrategy::Gradient { tolerance } => {
                gradient_keep_bits(filtered, inflevel, tolerance)
            }
        };
        Ok(keep)
    }
}

/// First position whose normalized cumulative information exceeds `inflevel`.
fn threshold_keep_bits(curve: &InformationCurve, inflevel: f64) -> KeepBits {
    curve
        .cdf()
        .and_then(|cdf| cdf.iter().position(|&c| c > inflevel))
        .map(KeepBits::from_position)
        .unwrap_or(KeepBits::FULL)
}

/// Zero the mantissa tail once it stops decaying monotonically.
fn monotonic_filtered(curve: &InformationCurve) -> InformationCurve {
    let m = curve.values();
    let mut values = [0.0; NBITS];
    values[..NON_MANTISSA_BITS].copy_from_slice(&m[..NON_MANTISSA_BITS]);

    let mut running_min = m[NON_MANTISSA_BITS];
    let mut jumps = 0;
    for pos in NON_MANTISSA_BITS..NBITS {
        running_min = running_min.min(m[pos]);
        if m[pos] > running_min * MONOTONIC_JUMP_FACTOR {
            jumps += 1;
        }
        values[pos] = if jumps > MONOTONIC_MAX_JUMPS { 0.0 } else { m[pos] };
    }

    InformationCurve::new(values)
}

/// Keep-bits at the point where the CDF flattens out.
fn gradient_keep_bits(curve: &InformationCurve, inflevel: f64, tolerance: f64) -> KeepBits {
    let Some(cdf) = curve.cdf() else {
        return KeepBits::FULL;
    };

    let m = curve.values();
    let total = curve.total();
    let mut retained: f64 = m[..NON_MANTISSA_BITS].iter().sum();
    let mut last = NBITS - 1;

    for pos in NON_MANTISSA_BITS..NBITS - 2 {
        retained += m[pos];
        let gradient = cdf[pos + 1] - cdf[pos];
        if gradient < tolerance && retained >= inflevel * total {
            last = pos;
            break;
        }
    }

    KeepBits::from_position(last)
}

/// Full decision: significance filter, then `strategy`.
///
/// `samples` is the number of observations behind `curve` (adjacent pairs).
///
/// # Example
/// ```
/// use bitround_rs::{keep_bits, InformationCurve, KeepBits, KeepBitsStrategy};
///
/// let nsb = keep_bits(
///     &InformationCurve::zeros(),
///     1000,
///     0.99,
///     0.9999,
///     KeepBitsStrategy::default(),
/// )
/// .unwrap();
/// assert_eq!(nsb, KeepBits::FULL);
/// ```
pub fn keep_bits(
    curve: &InformationCurve,
    samples: usize,
    confidence: f64,
    inflevel: f64,
    strategy: KeepBitsStrategy,
) -> Result<KeepBits, BitRoundError> {
    let significant = curve.significance_filtered(samples, confidence)?;
    strategy.select(&significant, inflevel)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve_with(entries: &[(usize, f64)]) -> InformationCurve {
        let mut values = [0.0; NBITS];
        for &(pos, v) in entries {
            values[pos] = v;
        }
        InformationCurve::new(values)
    }

    #[test]
    fn test_keep_bits_range() {
        assert!(KeepBits::new(0).is_err());
        assert!(KeepBits::new(24).is_err());
        assert_eq!(KeepBits::new(1).unwrap(), KeepBits::MIN);
        assert_eq!(KeepBits::new(23).unwrap(), KeepBits::FULL);
        assert_eq!(KeepBits::try_from(7).unwrap().get(), 7);
        assert_eq!(KeepBits::new(7).unwrap().dropped(), 16);
        assert_eq!(KeepBits::default(), KeepBits::FULL);
    }

    #[test]
    fn test_keep_bits_clamped() {
        assert_eq!(KeepBits::clamped(-8), KeepBits::MIN);
        assert_eq!(KeepBits::clamped(0), KeepBits::MIN);
        assert_eq!(KeepBits::clamped(99), KeepBits::FULL);
        assert_eq!(KeepBits::clamped(12).get(), 12);
    }

    #[test]
    fn test_keep_bits_display() {
        assert_eq!(KeepBits::FULL.to_string(), "23");
        assert_eq!(KeepBitsStrategy::Monotonic.to_string(), "monotonic");
    }

    #[test]
    fn test_zero_curve_keeps_everything() {
        for strategy in [
            KeepBitsStrategy::InformationThreshold,
            KeepBitsStrategy::Monotonic,
            KeepBitsStrategy::Gradient { tolerance: 0.01 },
        ] {
            let nsb = strategy.select(&InformationCurve::zeros(), 0.99).unwrap();
            assert_eq!(nsb, KeepBits::FULL, "{}", strategy);
        }
    }

    #[test]
    fn test_inflevel_validated() {
        let curve = InformationCurve::zeros();
        for bad in [0.0, 1.0, -0.1, 1.1, f64::NAN] {
            assert!(matches!(
                KeepBitsStrategy::default().select(&curve, bad),
                Err(BitRoundError::InvalidArgument {
                    name: "inflevel",
                    ..
                })
            ));
        }
    }

    #[test]
    fn test_threshold_selects_first_position_above_level() {
        // All information in positions 9..=12 (first four mantissa bits).
        let curve = curve_with(&[(9, 0.4), (10, 0.3), (11, 0.2), (12, 0.1)]);
        let s = KeepBitsStrategy::InformationThreshold;
        assert_eq!(s.select(&curve, 0.3).unwrap().get(), 1);
        assert_eq!(s.select(&curve, 0.5).unwrap().get(), 2);
        assert_eq!(s.select(&curve, 0.8).unwrap().get(), 3);
        assert_eq!(s.select(&curve, 0.95).unwrap().get(), 4);
        assert_eq!(s.select(&curve, 0.9999).unwrap().get(), 4);
    }

    #[test]
    fn test_threshold_clamps_to_one_for_exponent_information() {
        // Everything sits in the exponent: position 3 -> 3 + 1 - 9 < 1.
        let curve = curve_with(&[(3, 1.0)]);
        let nsb = KeepBitsStrategy::InformationThreshold
            .select(&curve, 0.5)
            .unwrap();
        assert_eq!(nsb, KeepBits::MIN);
    }

    #[test]
    fn test_threshold_applies_noise_floor() {
        // Position 20 carries little compared to the floor from position 30.
        let curve = curve_with(&[(9, 1.0), (20, 0.01), (30, 0.008)]);
        let nsb = KeepBitsStrategy::InformationThreshold
            .select(&curve, 0.999)
            .unwrap();
        assert_eq!(nsb.get(), 1);
    }

    #[test]
    fn test_monotonic_cuts_after_third_jump() {
        let curve = curve_with(&[
            (9, 0.8),
            (10, 0.4),
            (11, 0.2),
            (12, 0.1),
            (13, 0.3),
            (14, 0.3),
            (15, 0.3),
            (16, 0.3),
        ]);
        let filtered = monotonic_filtered(&curve);
        assert_eq!(filtered[12], 0.1);
        assert_eq!(filtered[13], 0.3);
        assert_eq!(filtered[14], 0.3);
        assert_eq!(filtered[15], 0.0);
        assert_eq!(filtered[16], 0.0);
    }

    #[test]
    fn test_monotonic_keeps_sign_and_exponent() {
        let curve = curve_with(&[(0, 0.5), (4, 0.25), (9, 0.1)]);
        let filtered = monotonic_filtered(&curve);
        assert_eq!(filtered[0], 0.5);
        assert_eq!(filtered[4], 0.25);
        assert_eq!(filtered[9], 0.1);
    }

    #[test]
    fn test_monotonic_select() {
        let curve = curve_with(&[(9, 0.5), (10, 0.25), (11, 0.125), (12, 0.125)]);
        let nsb = KeepBitsStrategy::Monotonic.select(&curve, 0.8).unwrap();
        assert_eq!(nsb.get(), 3);
    }

    #[test]
    fn test_gradient_stops_where_cdf_flattens() {
        let curve = curve_with(&[(9, 0.5), (10, 0.3), (11, 0.15), (12, 0.05)]);
        let s = KeepBitsStrategy::Gradient { tolerance: 0.1 };
        // At position 11 the next step is 0.05 < 0.1 and 95% is retained.
        assert_eq!(s.select(&curve, 0.9).unwrap().get(), 3);
    }

    #[test]
    fn test_gradient_tolerance_validated() {
        let curve = curve_with(&[(9, 0.5), (10, 0.5)]);
        for bad in [-0.1, f64::NAN] {
            let s = KeepBitsStrategy::Gradient { tolerance: bad };
            assert!(matches!(
                s.select(&curve, 0.5),
                Err(BitRoundError::InvalidArgument {
                    name: "tolerance",
                    ..
                })
            ));
            assert!(keep_bits(&curve, 1000, 0.99, 0.5, s).is_err());
        }
    }

    #[test]
    fn test_gradient_falls_back_to_full() {
        let curve = curve_with(&[(9, 0.5), (10, 0.5)]);
        let s = KeepBitsStrategy::Gradient { tolerance: 0.0 };
        assert_eq!(s.select(&curve, 0.5).unwrap(), KeepBits::FULL);
    }

    #[test]
    fn test_keep_bits_filters_noise_first() {
        // Values below the free-entropy bound for 100 samples are noise.
        let curve = curve_with(&[(9, 1e-4), (10, 1e-5)]);
        let nsb = keep_bits(&curve, 100, 0.99, 0.9, KeepBitsStrategy::default()).unwrap();
        assert_eq!(nsb, KeepBits::FULL);
    }

    #[test]
    fn test_keep_bits_rejects_bad_confidence() {
        let curve = InformationCurve::zeros();
        assert!(keep_bits(&curve, 100, 0.0, 0.9, KeepBitsStrategy::default()).is_err());
    }

    #[test]
    fn test_threshold_monotone_in_inflevel() {
        let curve = curve_with(&[
            (0, 0.01),
            (3, 0.2),
            (9, 0.9),
            (10, 0.7),
            (12, 0.4),
            (15, 0.2),
            (19, 0.05),
        ]);
        for strategy in [
            KeepBitsStrategy::InformationThreshold,
            KeepBitsStrategy::Monotonic,
        ] {
            let mut prev = 0;
            for i in 1..100 {
                let level = i as f64 / 100.0;
                let nsb = strategy.select(&curve, level).unwrap().get();
                assert!(nsb >= prev, "{} at {}", strategy, level);
                prev = nsb;
            }
        }
    }
}
