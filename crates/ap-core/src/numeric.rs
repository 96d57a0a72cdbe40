/// Floating point type used for every signal.
pub type Real = f64;

/// Standard gravitational acceleration (m/s^2) used by turn geometry.
pub const GRAVITY: Real = 9.81;

/// Absolute/relative tolerance pair for float comparisons.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

/// Replace a non-finite value with zero.
///
/// Signals read from sensors may be NaN before the first valid sample; the
/// elements that sanitize hand `0.0` to their consumers instead.
#[inline]
pub fn sanitize(v: Real) -> Real {
    if v.is_finite() { v } else { 0.0 }
}

/// Clamp `v` into `[lo, hi]` without asserting `lo <= hi`.
///
/// Upper bound is checked first, so an inverted interval resolves to `hi` for
/// large inputs and `lo` for small ones.
#[inline]
pub fn clamp_unordered(v: Real, lo: Real, hi: Real) -> Real {
    if v > hi {
        hi
    } else if v < lo {
        lo
    } else {
        v
    }
}
