//! Analysis and rounding pipeline for one chunk or a sequence of slices.
//!
//! A chunk goes through four steps:
//! 1. a signed-exponent working copy is made and analyzed into a raw
//!    information curve, then dropped;
//! 2. the curve is cleaned with the binomial significance bound;
//! 3. the keep-bits strategy picks the number of mantissa bits;
//! 4. the **original** chunk is rounded in place.
//!
//! Chunks share no state, so slices of a larger array can be processed
//! independently (in parallel with the `rayon` feature).

#[cfg(feature = "rayon")]
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::bitinfo::{bit_information, InformationCurve};
use crate::error::{check_unit_open, BitRoundError};
use crate::keepbits::{keep_bits, KeepBits, KeepBitsStrategy};
use crate::layout::{signed_exponent, NBITS};
use crate::quantize::quantize;
use crate::significance::DEFAULT_CONFIDENCE;

/// Information retention level used when the caller does not pick one.
pub const DEFAULT_INFLEVEL: f64 = 0.9999;

/// Settings for a [`BitRounder`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BitRoundConfig {
    /// Confidence level of the significance bound, in `(0, 1)`.
    pub confidence: f64,
    /// Fraction of the total information to retain, in `(0, 1)`.
    pub inflevel: f64,
    /// Keep-bits selection strategy.
    pub strategy: KeepBitsStrategy,
}

impl Default for BitRoundConfig {
    fn default() -> Self {
        BitRoundConfig {
            confidence: DEFAULT_CONFIDENCE,
            inflevel: DEFAULT_INFLEVEL,
            strategy: KeepBitsStrategy::default(),
        }
    }
}

impl BitRoundConfig {
    /// Default settings with the given retention level.
    pub fn new(inflevel: f64) -> Self {
        BitRoundConfig {
            inflevel,
            ..Default::default()
        }
    }

    /// Set the confidence level of the significance bound.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Set the keep-bits strategy.
    pub fn with_strategy(mut self, strategy: KeepBitsStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Check that both levels lie in `(0, 1)` and a gradient tolerance is
    /// not negative.
    pub fn validate(&self) -> Result<(), BitRoundError> {
        check_unit_open("confidence", self.confidence)?;
        check_unit_open("inflevel", self.inflevel)?;
        self.strategy.validate()
    }
}

/// Bit-information analyzer and rounder for `f32` data.
///
/// # Example
/// ```
/// use bitround_rs::{BitRoundConfig, BitRounder, KeepBits};
///
/// let rounder = BitRounder::new(BitRoundConfig::new(0.99)).unwrap();
///
/// // No information at all: the whole mantissa is kept.
/// let mut data = vec![1.0f32; 16];
/// let nsb = rounder.round(&mut data, f32::NAN).unwrap();
/// assert_eq!(nsb, KeepBits::FULL);
/// ```
#[derive(Debug, Clone)]
pub struct BitRounder {
    config: BitRoundConfig,
}

impl BitRounder {
    /// Create a rounder, validating `config`.
    pub fn new(config: BitRoundConfig) -> Result<Self, BitRoundError> {
        config.validate()?;
        Ok(BitRounder { config })
    }

    /// The settings in use.
    pub fn config(&self) -> &BitRoundConfig {
        &self.config
    }

    /// Raw information curve of a chunk's signed-exponent working copy.
    pub fn information_curve(&self, data: &[f32]) -> InformationCurve {
        let working = signed_exponent(data);
        bit_information(&working)
    }

    /// Number of mantissa bits worth keeping for `data`.
    ///
    /// Chunks with fewer than two elements keep the full mantissa.
    pub fn analyze(&self, data: &[f32]) -> Result<KeepBits, BitRoundError> {
        if data.len() < 2 {
            debug!(len = data.len(), "chunk too short, keeping full mantissa");
            return Ok(KeepBits::FULL);
        }

        let curve = self.information_curve(data);
        let pairs = data.len() - 1;
        let nsb = keep_bits(
            &curve,
            pairs,
            self.config.confidence,
            self.config.inflevel,
            self.config.strategy,
        )?;

        debug!(
            len = data.len(),
            total_information = curve.total(),
            strategy = %self.config.strategy,
            nsb = nsb.get(),
            "analyzed chunk"
        );
        Ok(nsb)
    }

    /// Analyze `data` and round it in place; returns the bits kept.
    pub fn round(&self, data: &mut [f32], sentinel: f32) -> Result<KeepBits, BitRoundError> {
        let nsb = self.analyze(data)?;
        quantize(data, nsb, sentinel);
        Ok(nsb)
    }

    /// Analyze and round each consecutive `slice_len` slice independently.
    ///
    /// Returns one [`KeepBits`] per slice, in order. A shorter trailing slice
    /// is processed as its own chunk.
    pub fn round_slices(
        &self,
        data: &mut [f32],
        slice_len: usize,
        sentinel: f32,
    ) -> Result<Vec<KeepBits>, BitRoundError> {
        if slice_len == 0 {
            return Err(BitRoundError::invalid(
                "slice_len",
                0.0,
                "must be at least 1",
            ));
        }

        let result = self.round_chunks(data, slice_len, sentinel);
        if let Ok(bits) = &result {
            debug!(slices = bits.len(), slice_len, "rounded slices");
        }
        result
    }

    #[cfg(feature = "rayon")]
    fn round_chunks(
        &self,
        data: &mut [f32],
        slice_len: usize,
        sentinel: f32,
    ) -> Result<Vec<KeepBits>, BitRoundError> {
        data.par_chunks_mut(slice_len)
            .enumerate()
            .map(|(index, chunk)| self.round_slice(index, chunk, sentinel))
            .collect()
    }

    #[cfg(not(feature = "rayon"))]
    fn round_chunks(
        &self,
        data: &mut [f32],
        slice_len: usize,
        sentinel: f32,
    ) -> Result<Vec<KeepBits>, BitRoundError> {
        data.chunks_mut(slice_len)
            .enumerate()
            .map(|(index, chunk)| self.round_slice(index, chunk, sentinel))
            .collect()
    }

    fn round_slice(
        &self,
        index: usize,
        chunk: &mut [f32],
        sentinel: f32,
    ) -> Result<KeepBits, BitRoundError> {
        let nsb = self.round(chunk, sentinel)?;
        trace!(slice = index, nsb = nsb.get(), "rounded slice");
        Ok(nsb)
    }
}

/// Keep-bits for one chunk with the default strategy.
///
/// # Example
/// ```
/// use bitround_rs::{analyze, KeepBits};
///
/// let nsb = analyze(&[1.0, 1.0, 1.0, 1.0], 0.99, 0.9999).unwrap();
/// assert_eq!(nsb, KeepBits::FULL);
/// ```
pub fn analyze(data: &[f32], confidence: f64, inflevel: f64) -> Result<KeepBits, BitRoundError> {
    BitRounder::new(BitRoundConfig::new(inflevel).with_confidence(confidence))?.analyze(data)
}

/// Unfiltered information curve of `data` (after the signed-exponent relayout).
///
/// Diagnostic only; [`analyze`] computes its own curve.
pub fn raw_information_curve(data: &[f32]) -> [f64; NBITS] {
    bit_information(&signed_exponent(data)).into()
}
