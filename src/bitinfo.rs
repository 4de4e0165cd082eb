//! Bit-plane mutual information between neighbouring samples.
//!
//! For each of the 32 bit positions, the analyzer counts how often the bit
//! of sample `i` and the bit of sample `i + 1` take each of the four value
//! combinations, and turns the counts into the mutual information (in bits)
//! that one sample's bit carries about the next one's.

use std::ops::Index;

use crate::error::BitRoundError;
use crate::layout::{bit_at, NBITS};
use crate::significance::free_entropy_bound;

/// Number of low positions used to estimate the residual noise floor.
const NOISE_FLOOR_BITS: usize = 4;

/// Multiplier applied to the low-bit maximum to obtain the noise floor.
const NOISE_FLOOR_FACTOR: f64 = 1.5;

/// 2×2 contingency table per bit position.
///
/// `counts[pos][a][b]` is the number of adjacent pairs whose first element
/// has bit value `a` and whose second element has bit value `b` at `pos`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitPairCounts {
    counts: [[[u64; 2]; 2]; NBITS],
    pairs: usize,
}

impl BitPairCounts {
    /// Count bit pairs over every adjacent pair of `data`.
    pub fn from_slice(data: &[f32]) -> Self {
        let mut counts = [[[0u64; 2]; 2]; NBITS];
        for pair in data.windows(2) {
            let a = pair[0].to_bits();
            let b = pair[1].to_bits();
            for (pos, table) in counts.iter_mut().enumerate() {
                table[bit_at(a, pos)][bit_at(b, pos)] += 1;
            }
        }

        BitPairCounts {
            counts,
            pairs: data.len().saturating_sub(1),
        }
    }

    /// Number of adjacent pairs that were counted.
    #[inline]
    pub fn pairs(&self) -> usize {
        self.pairs
    }

    /// Contingency table for one bit position (0 = sign).
    #[inline]
    pub fn table(&self, position: usize) -> [[u64; 2]; 2] {
        self.counts[position]
    }

    /// Mutual information per position.
    ///
    /// Round-off can push a value a hair below zero; such values are clamped
    /// to `0.0`. With no pairs the curve is all zeros.
    pub fn mutual_information(&self) -> InformationCurve {
        let mut values = [0.0f64; NBITS];
        if self.pairs == 0 {
            return InformationCurve::new(values);
        }

        let n = self.pairs as f64;
        for (value, table) in values.iter_mut().zip(self.counts.iter()) {
            let mut p = [[0.0f64; 2]; 2];
            for a in 0..2 {
                for b in 0..2 {
                    p[a][b] = table[a][b] as f64 / n;
                }
            }
            *value = mutual_information_2x2(&p).max(0.0);
        }

        InformationCurve::new(values)
    }
}

/// Mutual information in bits of a 2×2 joint distribution.
fn mutual_information_2x2(p: &[[f64; 2]; 2]) -> f64 {
    let pa = [p[0][0] + p[0][1], p[1][0] + p[1][1]];
    let pb = [p[0][0] + p[1][0], p[0][1] + p[1][1]];

    let mut m = 0.0;
    for a in 0..2 {
        for b in 0..2 {
            if p[a][b] > 0.0 {
                m += p[a][b] * (p[a][b] / (pa[a] * pb[b])).ln();
            }
        }
    }
    m / std::f64::consts::LN_2
}

/// One mutual-information value (bits) per bit position, sign bit first.
///
/// Filters return a new curve; a curve is never modified in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InformationCurve {
    values: [f64; NBITS],
}

impl InformationCurve {
    /// Wrap raw per-position values.
    pub fn new(values: [f64; NBITS]) -> Self {
        InformationCurve { values }
    }

    /// An all-zero curve.
    pub fn zeros() -> Self {
        InformationCurve {
            values: [0.0; NBITS],
        }
    }

    /// The per-position values.
    #[inline]
    pub fn values(&self) -> &[f64; NBITS] {
        &self.values
    }

    /// Sum over all positions.
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Whether every position carries zero information.
    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|&v| v == 0.0)
    }

    /// Zero every position at or below the binomial free-entropy bound for
    /// `samples` observations.
    pub fn significance_filtered(
        &self,
        samples: usize,
        confidence: f64,
    ) -> Result<InformationCurve, BitRoundError> {
        let bound = free_entropy_bound(samples, confidence)?;
        Ok(self.map(|v| if v <= bound { 0.0 } else { v }))
    }

    /// Noise floor: 1.5 × the largest value among the four lowest positions.
    pub fn noise_floor(&self) -> f64 {
        let low = &self.values[NBITS - NOISE_FLOOR_BITS..];
        NOISE_FLOOR_FACTOR * low.iter().copied().fold(f64::MIN, f64::max)
    }

    /// Zero every position not strictly above [`noise_floor`](Self::noise_floor).
    pub fn noise_floor_filtered(&self) -> InformationCurve {
        let floor = self.noise_floor();
        self.map(|v| if v > floor { v } else { 0.0 })
    }

    /// Running sum from the sign bit towards the least significant bit.
    pub fn cumulative(&self) -> [f64; NBITS] {
        let mut acc = 0.0;
        let mut out = [0.0; NBITS];
        for (o, v) in out.iter_mut().zip(self.values.iter()) {
            acc += v;
            *o = acc;
        }
        out
    }

    /// Cumulative sum normalized by the total, or `None` when the total is 0.
    pub fn cdf(&self) -> Option<[f64; NBITS]> {
        let mut cum = self.cumulative();
        let total = cum[NBITS - 1];
        if total <= 0.0 {
            return None;
        }
        for c in cum.iter_mut() {
            *c /= total;
        }
        Some(cum)
    }

    fn map(&self, f: impl Fn(f64) -> f64) -> InformationCurve {
        let mut values = self.values;
        for v in values.iter_mut() {
            *v = f(*v);
        }
        InformationCurve { values }
    }
}

impl Default for InformationCurve {
    fn default() -> Self {
        InformationCurve::zeros()
    }
}

impl Index<usize> for InformationCurve {
    type Output = f64;

    fn index(&self, position: usize) -> &f64 {
        &self.values[position]
    }
}

impl From<InformationCurve> for [f64; NBITS] {
    fn from(curve: InformationCurve) -> Self {
        curve.values
    }
}

/// Raw mutual-information curve of an (already transformed) buffer.
///
/// Buffers shorter than two elements have no pairs and yield all zeros.
pub fn bit_information(data: &[f32]) -> InformationCurve {
    BitPairCounts::from_slice(data).mutual_information()
}
