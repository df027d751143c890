//! Scalar types the SVD can work in
//!
//! Two working precisions are supported: plain `f64` and the double-double
//! type [`Df64`] (about 32 significant digits). All algorithms in this
//! crate are generic over [`Precision`] and only use the operations listed
//! here, so no transcendental functions of `Df64` are required.

use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Sub};

mod df64;

pub use df64::{Df64, DF64_EPSILON};

/// Trait for precision types used in the SVD computations
pub trait Precision:
    Copy
    + Debug
    + PartialEq
    + PartialOrd
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// Convert from `f64` (exact)
    fn from_f64(x: f64) -> Self;

    /// Round to the nearest `f64`
    fn to_f64(self) -> f64;

    /// Machine epsilon for this precision type
    fn epsilon() -> Self;

    /// Square root, correctly rounded up to a few ulps
    fn sqrt(self) -> Self;

    fn is_finite(self) -> bool;

    #[inline]
    fn zero() -> Self {
        Self::from_f64(0.0)
    }

    #[inline]
    fn one() -> Self {
        Self::from_f64(1.0)
    }

    #[inline]
    fn abs(self) -> Self {
        if self < Self::zero() {
            -self
        } else {
            self
        }
    }

    #[inline]
    fn max(self, other: Self) -> Self {
        if self >= other {
            self
        } else {
            other
        }
    }

    #[inline]
    fn min(self, other: Self) -> Self {
        if self <= other {
            self
        } else {
            other
        }
    }
}

impl Precision for f64 {
    #[inline]
    fn from_f64(x: f64) -> f64 {
        x
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn epsilon() -> f64 {
        f64::EPSILON
    }

    #[inline]
    fn sqrt(self) -> f64 {
        self.sqrt()
    }

    #[inline]
    fn is_finite(self) -> bool {
        self.is_finite()
    }

    #[inline]
    fn abs(self) -> f64 {
        self.abs()
    }
}

impl Precision for Df64 {
    #[inline]
    fn from_f64(x: f64) -> Df64 {
        Df64::from(x)
    }

    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    #[inline]
    fn epsilon() -> Df64 {
        Df64::from(DF64_EPSILON)
    }

    #[inline]
    fn sqrt(self) -> Df64 {
        Df64::sqrt(self)
    }

    #[inline]
    fn is_finite(self) -> bool {
        Df64::is_finite(self)
    }
}
