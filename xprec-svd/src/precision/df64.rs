//! Double-double scalar type
//!
//! [`Df64`] wraps `twofloat::TwoFloat` and forwards addition, subtraction,
//! multiplication, division by an `f64` and the square root to it. Division
//! by a double-double is done here: `TwoFloat` computes the correction term
//! of its reciprocal without a fused multiply-add, so its quotient is only
//! accurate to double precision.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use twofloat::TwoFloat;

/// Unit roundoff of double-double arithmetic, 2^-105.
pub const DF64_EPSILON: f64 = f64::EPSILON * f64::EPSILON * 0.5;

/// Double-double number `hi + lo` with |lo| <= ulp(hi)/2, about 32 significant digits
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Df64(TwoFloat);

impl Df64 {
    pub const ZERO: Df64 = Df64(TwoFloat::from_f64(0.0));
    pub const ONE: Df64 = Df64(TwoFloat::from_f64(1.0));

    /// Normalized sum of two doubles (exact)
    pub fn new(hi: f64, lo: f64) -> Self {
        Df64(TwoFloat::new_add(hi, lo))
    }

    /// Leading double
    #[inline]
    pub fn hi(self) -> f64 {
        self.0.hi()
    }

    /// Trailing correction
    #[inline]
    pub fn lo(self) -> f64 {
        self.0.lo()
    }

    pub fn sqrt(self) -> Self {
        Df64(self.0.sqrt())
    }

    pub fn is_finite(self) -> bool {
        self.0.hi().is_finite() && self.0.lo().is_finite()
    }
}

impl From<f64> for Df64 {
    #[inline]
    fn from(x: f64) -> Self {
        Df64(TwoFloat::from(x))
    }
}

impl From<Df64> for f64 {
    #[inline]
    fn from(x: Df64) -> f64 {
        x.hi() + x.lo()
    }
}

impl From<TwoFloat> for Df64 {
    #[inline]
    fn from(x: TwoFloat) -> Self {
        Df64(x)
    }
}

impl From<Df64> for TwoFloat {
    #[inline]
    fn from(x: Df64) -> TwoFloat {
        x.0
    }
}

impl fmt::Display for Df64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Add for Df64 {
    type Output = Df64;

    #[inline]
    fn add(self, rhs: Df64) -> Df64 {
        Df64(self.0 + rhs.0)
    }
}

impl Sub for Df64 {
    type Output = Df64;

    #[inline]
    fn sub(self, rhs: Df64) -> Df64 {
        Df64(self.0 - rhs.0)
    }
}

impl Mul for Df64 {
    type Output = Df64;

    #[inline]
    fn mul(self, rhs: Df64) -> Df64 {
        Df64(self.0 * rhs.0)
    }
}

impl Mul<f64> for Df64 {
    type Output = Df64;

    #[inline]
    fn mul(self, rhs: f64) -> Df64 {
        Df64(self.0 * rhs)
    }
}

impl Div<f64> for Df64 {
    type Output = Df64;

    #[inline]
    fn div(self, rhs: f64) -> Df64 {
        Df64(self.0 / rhs)
    }
}

impl Div for Df64 {
    type Output = Df64;

    /// Quotient by the leading double of `rhs`, then one residual correction
    fn div(self, rhs: Df64) -> Df64 {
        if rhs.hi() == 0.0 {
            return Df64::from(self.hi() / rhs.hi());
        }
        let q1 = self.0 / rhs.hi();
        if rhs.lo() == 0.0 || !q1.hi().is_finite() {
            return Df64(q1);
        }
        let r = self.0 - q1 * rhs.0;
        Df64(q1 + r / rhs.hi())
    }
}

impl Neg for Df64 {
    type Output = Df64;

    #[inline]
    fn neg(self) -> Df64 {
        Df64(-self.0)
    }
}
