//! IEEE 754 single-precision bit layout and the signed-exponent relayout.
//!
//! Positions in this crate count from the most significant bit: position 0
//! is the sign, positions 1..=8 the exponent, positions 9..=31 the mantissa.

/// Total number of bits in an `f32`.
pub const NBITS: usize = 32;

/// Number of sign bits.
pub const SIGN_BITS: usize = 1;

/// Number of exponent bits.
pub const EXPONENT_BITS: usize = 8;

/// Number of explicitly stored mantissa bits.
pub const MANTISSA_BITS: usize = 23;

/// Bits in front of the mantissa (sign plus exponent).
pub const NON_MANTISSA_BITS: usize = SIGN_BITS + EXPONENT_BITS;

/// Exponent bias.
pub const EXPONENT_BIAS: i32 = 127;

/// Mask for the sign bit.
pub const SIGN_MASK: u32 = 0x8000_0000;

/// Mask for the biased exponent field.
pub const EXPONENT_MASK: u32 = 0x7F80_0000;

/// Mask for the mantissa field.
pub const MANTISSA_MASK: u32 = 0x007F_FFFF;

/// Sign of the unbiased exponent after the signed-exponent relayout.
const EXPONENT_SIGN_MASK: u32 = SIGN_MASK >> 1;

/// Extract the bit at `position` (0 = sign) from a raw pattern.
#[inline]
pub fn bit_at(bits: u32, position: usize) -> usize {
    ((bits >> (NBITS - 1 - position)) & 1) as usize
}

/// Rewrite the exponent field of one bit pattern in sign-magnitude form.
///
/// The unbiased exponent `e = E - 127` is stored with its sign in bit 30 and
/// `|e|` in bits 23..=29. Sign and mantissa bits pass through. For Inf/NaN
/// (`|e| = 128`) the magnitude spills into bit 30; the result only feeds the
/// information analysis, so it is never decoded back.
#[inline]
pub fn signed_exponent_bits(bits: u32) -> u32 {
    let sign_and_mantissa = bits & (SIGN_MASK | MANTISSA_MASK);
    let e = ((bits & EXPONENT_MASK) >> MANTISSA_BITS) as i32 - EXPONENT_BIAS;
    let e_sign = if e < 0 { EXPONENT_SIGN_MASK } else { 0 };
    sign_and_mantissa | e_sign | (e.unsigned_abs() << MANTISSA_BITS)
}

/// Return a signed-exponent working copy of `data`.
///
/// The input is left untouched; the copy is meant to be analyzed and dropped.
pub fn signed_exponent(data: &[f32]) -> Vec<f32> {
    data.iter()
        .map(|v| f32::from_bits(signed_exponent_bits(v.to_bits())))
        .collect()
}
