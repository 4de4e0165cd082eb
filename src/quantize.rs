//! In-place bit rounding of `f32` buffers.
//!
//! Rounding adds a bias of one unit below half a quantum and then clears the
//! dropped mantissa bits:
//!
//! ```text
//! z         = 23 - keep
//! zero_mask = !0 << z
//! one_mask  = !zero_mask
//! half_bias = one_mask >> 1
//! u'        = (u + half_bias) & zero_mask
//! ```
//!
//! The addition may carry out of the mantissa into the exponent, which moves
//! the value to the next power of two when rounding crosses one. Exact ties
//! are not rounded to even: the fixed bias is just short of half a quantum,
//! so a tie rounds towards the smaller magnitude.

use crate::keepbits::KeepBits;

/// NetCDF's default fill value for `float` variables.
///
/// Useful as the sentinel when a variable declares no `_FillValue`.
pub const DEFAULT_FILL_VALUE: f32 = 9.969_21e36;

/// Masks that implement rounding to a given number of mantissa bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantizationMask {
    /// Bits that survive rounding.
    pub zero_mask: u32,
    /// Additive bias applied before masking.
    pub half_bias: u32,
}

impl QuantizationMask {
    /// Masks for keeping `keep` mantissa bits.
    pub fn new(keep: KeepBits) -> Self {
        let zero_mask = u32::MAX << keep.dropped();
        let one_mask = !zero_mask;
        QuantizationMask {
            zero_mask,
            half_bias: one_mask >> 1,
        }
    }

    /// Round one raw bit pattern.
    #[inline]
    pub fn apply(&self, bits: u32) -> u32 {
        bits.wrapping_add(self.half_bias) & self.zero_mask
    }
}

/// Whether `value` is NaN or equal to `sentinel`.
///
/// Equality is IEEE `==`, so a `0.0` sentinel also matches `-0.0`.
#[inline]
pub fn is_missing(value: f32, sentinel: f32) -> bool {
    value.is_nan() || value == sentinel
}

/// Whether any element is NaN or the sentinel.
pub fn contains_missing(data: &[f32], sentinel: f32) -> bool {
    data.iter().any(|&v| is_missing(v, sentinel))
}

/// Round `data` in place to `keep` mantissa bits.
///
/// NaN and sentinel elements are left bit-for-bit unchanged. Keeping all 23
/// bits is a no-op.
///
/// # Example
/// ```
/// use bitround_rs::{quantize, KeepBits};
///
/// let mut data = vec![1.875f32, 1.0, f32::NAN];
/// quantize(&mut data, KeepBits::new(1).unwrap(), -999.0);
/// assert_eq!(data[0], 2.0);
/// assert_eq!(data[1], 1.0);
/// assert!(data[2].is_nan());
/// ```
pub fn quantize(data: &mut [f32], keep: KeepBits, sentinel: f32) {
    if keep == KeepBits::FULL {
        return;
    }

    let mask = QuantizationMask::new(keep);
    for v in data.iter_mut() {
        if !is_missing(*v, sentinel) {
            *v = f32::from_bits(mask.apply(v.to_bits()));
        }
    }
}
