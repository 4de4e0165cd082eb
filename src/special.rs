//! Special functions used by the significance bound.
//!
//! Everything here is a pure function of its arguments. The iterative
//! incomplete-gamma solvers are capped at [`MAX_ITERATIONS`]; hitting the cap
//! is reported as [`BitRoundError::NumericalDivergence`] instead of being
//! swallowed.

use std::f64::consts::{FRAC_2_SQRT_PI, SQRT_2};

use crate::error::BitRoundError;

/// Iteration cap for the series and continued-fraction solvers.
pub const MAX_ITERATIONS: usize = 100;

/// Relative convergence tolerance of the incomplete-gamma solvers.
const GAMMA_EPS: f64 = f64::EPSILON;

/// Floor that keeps the modified Lentz recurrence away from division by zero.
const LENTZ_TINY: f64 = 1000.0 * f64::MIN_POSITIVE;

/// Lanczos coefficients (g = 5, n = 6).
const LANCZOS: [f64; 6] = [
    76.180_091_729_471_46,
    -86.505_320_329_416_77,
    24.014_098_240_830_91,
    -1.231_739_572_450_155,
    0.120_865_097_386_617_9e-2,
    -0.539_523_938_495_3e-5,
];

/// Acklam's inverse-normal coefficients, central region numerator.
const ACKLAM_A: [f64; 6] = [
    -3.969_683_028_665_376e1,
    2.209_460_984_245_205e2,
    -2.759_285_104_469_687e2,
    1.383_577_518_672_690e2,
    -3.066_479_806_614_716e1,
    2.506_628_277_459_239,
];

/// Central region denominator.
const ACKLAM_B: [f64; 5] = [
    -5.447_609_879_822_406e1,
    1.615_858_368_580_409e2,
    -1.556_989_798_598_866e2,
    6.680_131_188_771_972e1,
    -1.328_068_155_288_572e1,
];

/// Tail numerator.
const ACKLAM_C: [f64; 6] = [
    -7.784_894_002_430_293e-3,
    -3.223_964_580_411_365e-1,
    -2.400_758_277_161_838,
    -2.549_732_539_343_734,
    4.374_664_141_464_968,
    2.938_163_982_698_783,
];

/// Tail denominator.
const ACKLAM_D: [f64; 4] = [
    7.784_695_709_041_462e-3,
    3.224_671_290_700_398e-1,
    2.445_134_137_142_996,
    3.754_408_661_907_416,
];

/// Break-point between the lower tail and the central region.
const ACKLAM_P_LOW: f64 = 0.02425;

/// Standard normal probability density.
#[inline]
pub fn normal_density(x: f64) -> f64 {
    FRAC_2_SQRT_PI / 2.0 / SQRT_2 * (-x * x / 2.0).exp()
}

/// Standard normal cumulative distribution function.
///
/// Computed from the regularized incomplete gamma function through
/// `Φ(x) = ½(1 ± P(½, x²/2))`. Exactly `0.5` at `x = 0`; NaN is rejected
/// with [`BitRoundError::InvalidArgument`].
///
/// # Example
/// ```
/// use bitround_rs::special::normal_cdf;
///
/// let p = normal_cdf(1.959964).unwrap();
/// assert!((p - 0.975).abs() < 1e-6);
/// ```
pub fn normal_cdf(x: f64) -> Result<f64, BitRoundError> {
    if x.is_nan() {
        return Err(BitRoundError::invalid("x", x, "must not be NaN"));
    }
    if x > 0.0 {
        Ok(0.5 * (1.0 + regularized_incomplete_gamma(0.5, x * x / 2.0)?))
    } else if x < 0.0 {
        Ok(0.5 * (1.0 - regularized_incomplete_gamma(0.5, x * x / 2.0)?))
    } else {
        Ok(0.5)
    }
}

/// Inverse of the standard normal CDF (Acklam's rational approximation).
///
/// Returns `-∞` for `p <= 0` and `+∞` for `p >= 1`. The relative error is
/// about 1.15e-9 on the open interval.
pub fn inverse_normal_cdf(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    if p < ACKLAM_P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        return acklam_tail(q);
    }
    if p > 1.0 - ACKLAM_P_LOW {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        return -acklam_tail(q);
    }

    let q = p - 0.5;
    let r = q * q;
    let a = &ACKLAM_A;
    let b = &ACKLAM_B;
    (((((a[0] * r + a[1]) * r + a[2]) * r + a[3]) * r + a[4]) * r + a[5]) * q
        / (((((b[0] * r + b[1]) * r + b[2]) * r + b[3]) * r + b[4]) * r + 1.0)
}

#[inline]
fn acklam_tail(q: f64) -> f64 {
    let c = &ACKLAM_C;
    let d = &ACKLAM_D;
    (((((c[0] * q + c[1]) * q + c[2]) * q + c[3]) * q + c[4]) * q + c[5])
        / ((((d[0] * q + d[1]) * q + d[2]) * q + d[3]) * q + 1.0)
}

/// Natural logarithm of the gamma function for `x > 0`.
pub fn ln_gamma(x: f64) -> f64 {
    let mut y = x;
    let tmp = x + 5.5;
    let tmp = tmp - (x + 0.5) * tmp.ln();
    let mut ser = 1.000_000_000_190_015;
    for coef in LANCZOS {
        y += 1.0;
        ser += coef / y;
    }
    -tmp + (2.506_628_274_631_000_5 * ser / x).ln()
}

/// Regularized lower incomplete gamma function `P(a, x)`.
///
/// Uses the power series for `x < a + 1` and the continued fraction for
/// the complement otherwise.
///
/// # Errors
/// * [`BitRoundError::InvalidArgument`] when `x < 0` or `a <= 0`.
/// * [`BitRoundError::NumericalDivergence`] when the chosen solver does not
///   converge within [`MAX_ITERATIONS`].
pub fn regularized_incomplete_gamma(a: f64, x: f64) -> Result<f64, BitRoundError> {
    if x.is_nan() || x < 0.0 {
        return Err(BitRoundError::invalid("x", x, "must be >= 0"));
    }
    if a.is_nan() || a <= 0.0 {
        return Err(BitRoundError::invalid("a", a, "must be > 0"));
    }

    if x < a + 1.0 {
        gamma_series(a, x)
    } else {
        Ok(1.0 - gamma_continued_fraction(a, x)?)
    }
}

/// `P(a, x)` by its series representation.
fn gamma_series(a: f64, x: f64) -> Result<f64, BitRoundError> {
    if x == 0.0 {
        return Ok(0.0);
    }

    let gln = ln_gamma(a);
    let mut ap = a;
    let mut del = 1.0 / a;
    let mut sum = del;

    for _ in 0..MAX_ITERATIONS {
        ap += 1.0;
        del *= x / ap;
        sum += del;
        if del.abs() < sum.abs() * GAMMA_EPS {
            return Ok(sum * (-x + a * x.ln() - gln).exp());
        }
    }

    Err(BitRoundError::NumericalDivergence {
        solver: "incomplete gamma series",
        a,
        x,
        iterations: MAX_ITERATIONS,
    })
}

/// `Q(a, x) = 1 - P(a, x)` by its continued fraction (modified Lentz).
fn gamma_continued_fraction(a: f64, x: f64) -> Result<f64, BitRoundError> {
    let gln = ln_gamma(a);
    let mut b = x + 1.0 - a;
    let mut c = 1.0 / LENTZ_TINY;
    let mut d = 1.0 / b;
    let mut h = d;

    for i in 1..=MAX_ITERATIONS {
        let i = i as f64;
        let an = -i * (i - a);
        b += 2.0;
        d = an * d + b;
        if d.abs() < LENTZ_TINY {
            d = LENTZ_TINY;
        }
        c = b + an / c;
        if c.abs() < LENTZ_TINY {
            c = LENTZ_TINY;
        }
        d = 1.0 / d;
        let del = d * c;
        h *= del;
        if (del - 1.0).abs() <= GAMMA_EPS {
            return Ok((-x + a * x.ln() - gln).exp() * h);
        }
    }

    Err(BitRoundError::NumericalDivergence {
        solver: "incomplete gamma continued fraction",
        a,
        x,
        iterations: MAX_ITERATIONS,
    })
}
