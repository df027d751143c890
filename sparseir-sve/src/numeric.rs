//! Custom numeric traits for high-precision computation
//!
//! [`CustomNumeric`] extends the SVD-level [`Precision`] trait with the few
//! transcendental functions needed to evaluate kernels, plus lossless
//! conversion between the supported working types (`f64` and `Df64`).

use twofloat::consts::LN_2;
use xprec_svd::{Df64, Precision};

/// Numeric trait for kernel evaluation and polynomial construction
///
/// Implemented for `f64` and `Df64`. Every value is representable as an
/// unevaluated sum `hi + lo` of two doubles, which is what [`convert`] uses to
/// move between working types.
///
/// [`convert`]: CustomNumeric::convert
pub trait CustomNumeric: Precision {
    /// Exponential function
    fn exp(self) -> Self;

    /// exp(x) - 1, accurate for small |x|
    fn exp_m1(self) -> Self;

    /// Split into leading and trailing doubles
    fn to_parts(self) -> (f64, f64);

    /// Build from leading and trailing doubles
    fn from_parts(hi: f64, lo: f64) -> Self;

    /// Convert to another working type
    ///
    /// Widening (`f64` to `Df64`) is exact; narrowing rounds to the
    /// nearest representable value.
    fn convert<U: CustomNumeric>(self) -> U {
        let (hi, lo) = self.to_parts();
        U::from_parts(hi, lo)
    }

    /// Convert an index or count
    #[inline]
    fn from_usize(n: usize) -> Self {
        Self::from_f64(n as f64)
    }
}

impl CustomNumeric for f64 {
    #[inline]
    fn exp(self) -> f64 {
        f64::exp(self)
    }

    #[inline]
    fn exp_m1(self) -> f64 {
        f64::exp_m1(self)
    }

    #[inline]
    fn to_parts(self) -> (f64, f64) {
        (self, 0.0)
    }

    #[inline]
    fn from_parts(hi: f64, lo: f64) -> f64 {
        hi + lo
    }
}

impl CustomNumeric for Df64 {
    fn exp(self) -> Df64 {
        df64_exp(self)
    }

    fn exp_m1(self) -> Df64 {
        if self.hi().abs() < REDUCED_BOUND {
            expm1_reduced(self)
        } else {
            df64_exp(self) - Df64::ONE
        }
    }

    #[inline]
    fn to_parts(self) -> (f64, f64) {
        (self.hi(), self.lo())
    }

    #[inline]
    fn from_parts(hi: f64, lo: f64) -> Df64 {
        Df64::new(hi, lo)
    }
}

// |r| <= ln(2)/2 after range reduction
const REDUCED_BOUND: f64 = 0.35;

const SQUARINGS: i32 = 4;
const TAYLOR_TERMS: usize = 16;

/// exp(r) - 1 for |r| <= 0.35
///
/// The argument is divided by 2^4, the Taylor series is summed in Horner
/// form, and the result is squared back up using (1 + p)^2 - 1 = p (2 + p),
/// which keeps full relative accuracy near zero.
fn expm1_reduced(r: Df64) -> Df64 {
    let two = Df64::from(2.0);
    let s = r * 2f64.powi(-SQUARINGS);

    let mut t = Df64::ONE;
    for k in (2..=TAYLOR_TERMS).rev() {
        t = Df64::ONE + s * t / k as f64;
    }
    let mut p = s * t;

    for _ in 0..SQUARINGS {
        p = p * (two + p);
    }
    p
}

fn df64_exp(x: Df64) -> Df64 {
    let hi = x.hi();
    if hi.is_nan() {
        return Df64::from(f64::NAN);
    }
    if hi > 709.78 {
        return Df64::from(f64::INFINITY);
    }
    if hi < -745.13 {
        return Df64::ZERO;
    }
    if hi.abs() < REDUCED_BOUND {
        return Df64::ONE + expm1_reduced(x);
    }

    let ln2 = Df64::from(LN_2);
    let k = (hi / ln2.hi()).round();
    let r = x - ln2 * k;
    let mantissa = Df64::ONE + expm1_reduced(r);

    // 2^k in two factors so that neither overflows nor underflows on its own
    let k = k as i32;
    let k1 = k / 2;
    mantissa * 2f64.powi(k1) * 2f64.powi(k - k1)
}
