//! # bitround-rs
//!
//! Information-preserving bit rounding for 32-bit floating-point arrays.
//!
//! Scientific data is usually stored with far more mantissa bits than the
//! measurement or model actually resolves. The low bits are noise: they are
//! expensive to compress and carry nothing. This crate finds how many
//! mantissa bits carry real information and clears the rest, so a
//! general-purpose compressor (deflate, zstd, ...) can shrink the data
//! substantially without discarding signal.
//!
//! ## Overview
//!
//! 1. **Bit information**: for each of the 32 bit positions, the mutual
//!    information between a sample's bit and its neighbour's bit is
//!    estimated from 2×2 contingency tables. The exponent is first rewritten
//!    in sign-magnitude form so its bits behave monotonically.
//! 2. **Significance**: information below what finite-sample noise can
//!    produce (a binomial bound at a chosen confidence) is discarded.
//! 3. **Keep-bits**: the smallest number of mantissa bits whose cumulative
//!    information exceeds the requested retention level (`inflevel`).
//! 4. **Rounding**: the remaining mantissa bits are cleared in place after
//!    adding a rounding bias; NaN and missing values are left untouched.
//!
//! ## Quick Start
//!
//! ```rust
//! use bitround_rs::{BitRoundConfig, BitRounder, DEFAULT_FILL_VALUE};
//!
//! // Keep 99% of the information, default confidence 0.99.
//! let rounder = BitRounder::new(BitRoundConfig::new(0.99)).unwrap();
//!
//! let mut data: Vec<f32> = (0..10_000).map(|i| (i as f32 * 0.001).sin()).collect();
//! let nsb = rounder.round(&mut data, DEFAULT_FILL_VALUE).unwrap();
//! assert!(nsb.get() >= 1 && nsb.get() <= 23);
//! ```
//!
//! The three building blocks are also available separately:
//!
//! ```rust
//! use bitround_rs::{analyze, quantize, raw_information_curve};
//!
//! let mut data = vec![1.0f32, 1.5, 1.25, 1.75, 1.5, 1.0];
//! let curve = raw_information_curve(&data);
//! assert_eq!(curve.len(), 32);
//!
//! let nsb = analyze(&data, 0.99, 0.9999).unwrap();
//! quantize(&mut data, nsb, f32::NAN);
//! ```
//!
//! ## Choosing a Retention Level
//!
//! | inflevel | Typical effect |
//! |----------|----------------|
//! | 0.99 | Aggressive; few mantissa bits survive |
//! | 0.999 | Balanced |
//! | 0.9999 | Conservative (default) |
//! | 0.99999 | Nearly lossless for smooth fields |
//!
//! ## Chunking
//!
//! Each call analyzes one chunk. How an array is partitioned is up to the
//! caller; [`BitRounder::round_slices`] processes consecutive fixed-length
//! slices (for example, one per trailing 2-D slice of a 3-D field)
//! independently, in parallel when the `rayon` feature is enabled.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bitinfo;
mod error;
mod keepbits;
pub mod layout;
mod quantize;
mod rounder;
pub mod significance;
pub mod special;

pub use bitinfo::{BitPairCounts, InformationCurve};
pub use error::BitRoundError;
pub use keepbits::{keep_bits, KeepBits, KeepBitsStrategy};
pub use quantize::{contains_missing, is_missing, quantize, QuantizationMask, DEFAULT_FILL_VALUE};
pub use rounder::{analyze, raw_information_curve, BitRoundConfig, BitRounder, DEFAULT_INFLEVEL};
pub use significance::DEFAULT_CONFIDENCE;

/// Convenience type alias for Results with BitRoundError.
pub type Result<T> = std::result::Result<T, BitRoundError>;
