//! Kernel implementations
//!
//! A kernel is the integrand of a Fredholm integral equation of the first kind,
//!
//! u(x) = integral of K(x, y) v(y) dy,
//!
//! where x ∈ [xmin, xmax] and y ∈ [ymin, ymax]. Besides evaluating K, a
//! kernel tells the SVE how to discretize it (segments and quadrature order)
//! and whether it is centrosymmetric, in which case the expansion can be
//! split into an even and an odd half-size problem.

use crate::error::SVEError;
use crate::numeric::CustomNumeric;
use xprec_svd::Precision;

/// Discretization hints for the singular value expansion of a kernel
#[derive(Debug, Clone, PartialEq)]
pub struct SVEHints {
    /// Segment edges in x, strictly increasing, spanning the x range
    pub segments_x: Vec<f64>,
    /// Segment edges in y, strictly increasing, spanning the y range
    pub segments_y: Vec<f64>,
    /// Gauss points per segment
    pub ngauss: usize,
    /// Expected number of significant singular values
    pub nsvals: usize,
}

/// Integral kernel K(x, y)
pub trait Kernel: Send + Sync {
    /// Evaluate K(x, y) in working precision `T`
    fn compute<T: CustomNumeric>(&self, x: T, y: T) -> T;

    /// Domain of x
    fn xrange(&self) -> (f64, f64);

    /// Domain of y
    fn yrange(&self) -> (f64, f64);

    /// Discretization hints for a target accuracy `epsilon`
    fn sve_hints(&self, epsilon: f64) -> Result<SVEHints, SVEError>;

    /// Check if the kernel is centrosymmetric.
    ///
    /// Returns true if and only if K(x, y) == K(-x, -y) for all values of x and y.
    /// This allows the kernel to be block-diagonalized, speeding up the
    /// singular value expansion by a factor of 4.
    fn is_centrosymmetric(&self) -> bool;

    /// Even (`sign = 1`) or odd (`sign = -1`) reduced kernel on the positive quadrant
    fn get_symmetrized(&self, sign: i32) -> Result<ReducedKernel<'_, Self>, SVEError>
    where
        Self: Sized,
    {
        ReducedKernel::new(self, sign)
    }
}

impl<K: Kernel> Kernel for &K {
    fn compute<T: CustomNumeric>(&self, x: T, y: T) -> T {
        (**self).compute(x, y)
    }

    fn xrange(&self) -> (f64, f64) {
        (**self).xrange()
    }

    fn yrange(&self) -> (f64, f64) {
        (**self).yrange()
    }

    fn sve_hints(&self, epsilon: f64) -> Result<SVEHints, SVEError> {
        (**self).sve_hints(epsilon)
    }

    fn is_centrosymmetric(&self) -> bool {
        (**self).is_centrosymmetric()
    }
}

/// Logistic kernel for fermionic analytical continuation
///
/// K(x, y) = exp(-Λy(x + 1)/2)/(1 + exp(-Λy)) on [-1, 1] × [-1, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogisticKernel {
    lambda: f64,
}

impl LogisticKernel {
    /// # Panics
    /// Panics if `lambda` is negative or not finite.
    pub fn new(lambda: f64) -> Self {
        assert!(
            lambda.is_finite() && lambda >= 0.0,
            "lambda must be non-negative and finite, got {lambda}"
        );
        Self { lambda }
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }
}

impl Kernel for LogisticKernel {
    fn compute<T: CustomNumeric>(&self, x: T, y: T) -> T {
        let one = T::one();
        let half = T::from_f64(0.5);
        let v = T::from_f64(self.lambda) * y;

        // Both branches only exponentiate non-positive arguments
        if v >= T::zero() {
            let x_plus = one + x;
            (-(x_plus * half * v)).exp() / (one + (-v).exp())
        } else {
            let x_minus = one - x;
            (x_minus * half * v).exp() / (one + v.exp())
        }
    }

    fn xrange(&self) -> (f64, f64) {
        (-1.0, 1.0)
    }

    fn yrange(&self) -> (f64, f64) {
        (-1.0, 1.0)
    }

    fn sve_hints(&self, epsilon: f64) -> Result<SVEHints, SVEError> {
        let log10_lambda = self.lambda.log10();

        let nzeros_x = rounded_count(15.0 * log10_lambda, 1);
        let segments_x = cosh_spaced_segments(nzeros_x, 0.143);

        let nzeros_y = rounded_count(20.0 * log10_lambda, 2);
        let mut diffs: Vec<f64> = LOGISTIC_LEADING_DIFFS.iter().take(nzeros_y).copied().collect();
        diffs.extend((LOGISTIC_LEADING_DIFFS.len()..nzeros_y).map(|i| 0.25 * (-0.25 * i as f64).exp()));
        let segments_y = mirrored_segments(&diffs);

        let l = log10_lambda.max(1.0);
        Ok(SVEHints {
            segments_x,
            segments_y,
            ngauss: ngauss_for(epsilon),
            nsvals: ((25.0 + l) * l).round() as usize,
        })
    }

    fn is_centrosymmetric(&self) -> bool {
        true
    }
}

// Spacing of the sign changes of the singular functions in y near -1
const LOGISTIC_LEADING_DIFFS: [f64; 20] = [
    0.01523, 0.03314, 0.04848, 0.05987, 0.06703, 0.07028, 0.07030, 0.06791, 0.06391, 0.05896,
    0.05358, 0.04814, 0.04288, 0.03795, 0.03342, 0.02932, 0.02565, 0.02239, 0.01951, 0.01699,
];

/// Regularized bosonic kernel for bosonic analytical continuation
///
/// K(x, y) = y * exp(-Λy(x + 1)/2)/(1 - exp(-Λy)) on [-1, 1] × [-1, 1],
/// continued by K(x, 0) = 1/Λ.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegularizedBoseKernel {
    lambda: f64,
}

impl RegularizedBoseKernel {
    /// # Panics
    /// Panics if `lambda` is not positive and finite.
    pub fn new(lambda: f64) -> Self {
        assert!(
            lambda.is_finite() && lambda > 0.0,
            "lambda must be positive and finite, got {lambda}"
        );
        Self { lambda }
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }
}

impl Kernel for RegularizedBoseKernel {
    fn compute<T: CustomNumeric>(&self, x: T, y: T) -> T {
        let one = T::one();
        let half = T::from_f64(0.5);
        let lambda = T::from_f64(self.lambda);
        let v = lambda * y;
        let absv = Precision::abs(v);

        let u = if v >= T::zero() {
            (one + x) * half
        } else {
            (one - x) * half
        };
        let enum_val = (-(absv * u)).exp();

        // |v| / expm1(-|v|) tends to -1 as v -> 0
        let denom = if absv.to_f64() >= 1e-200 {
            absv / (-absv).exp_m1()
        } else {
            -one
        };
        -(one / lambda) * enum_val * denom
    }

    fn xrange(&self) -> (f64, f64) {
        (-1.0, 1.0)
    }

    fn yrange(&self) -> (f64, f64) {
        (-1.0, 1.0)
    }

    fn sve_hints(&self, epsilon: f64) -> Result<SVEHints, SVEError> {
        let log10_lambda = self.lambda.log10();

        let nzeros_x = rounded_count(15.0 * log10_lambda, 15);
        let segments_x = cosh_spaced_segments(nzeros_x, 0.18);

        let nzeros_y = rounded_count(20.0 * log10_lambda, 20);
        let diffs: Vec<f64> = (0..nzeros_y)
            .map(|i| {
                let i = i as f64;
                0.12 / (0.0337 * i * (i + 1.0).ln()).exp()
            })
            .collect();
        let segments_y = mirrored_segments(&diffs);

        let l = log10_lambda.max(1.0);
        Ok(SVEHints {
            segments_x,
            segments_y,
            ngauss: ngauss_for(epsilon),
            nsvals: (28.0 * l) as usize,
        })
    }

    fn is_centrosymmetric(&self) -> bool {
        true
    }
}

/// Reduced kernel for centrosymmetric kernels restricted to positive interval.
///
/// For a kernel K on [-1, 1] × [-1, 1] that is centrosymmetric, i.e.,
/// K(x, y) = K(-x, -y), it is straightforward to show that the left/right
/// singular vectors can be chosen as either odd or even functions.
///
/// Consequently, they are singular functions of a reduced kernel K_red on
/// [0, 1] × [0, 1] that is given as either:
///
/// K_red(x, y) = K(x, y) + K(x, -y)  or  K(x, y) - K(x, -y)
///
/// This kernel is what this struct represents. The full singular functions can be
/// reconstructed by (anti-)symmetrically continuing them to the negative axis.
#[derive(Debug, Clone, Copy)]
pub struct ReducedKernel<'a, K> {
    inner: &'a K,
    sign: i32,
}

impl<'a, K: Kernel> ReducedKernel<'a, K> {
    /// # Errors
    /// [`SVEError::InvalidSymmetrySign`] unless `sign` is 1 or -1,
    /// [`SVEError::NotCentrosymmetric`] if the inner kernel is not centrosymmetric.
    pub fn new(inner: &'a K, sign: i32) -> Result<Self, SVEError> {
        if sign != 1 && sign != -1 {
            return Err(SVEError::InvalidSymmetrySign(sign));
        }
        if !inner.is_centrosymmetric() {
            return Err(SVEError::NotCentrosymmetric);
        }
        Ok(Self { inner, sign })
    }

    pub fn inner(&self) -> &'a K {
        self.inner
    }

    pub fn sign(&self) -> i32 {
        self.sign
    }
}

impl<K: Kernel> Kernel for ReducedKernel<'_, K> {
    fn compute<T: CustomNumeric>(&self, x: T, y: T) -> T {
        let k_plus = self.inner.compute(x, y);
        let k_minus = self.inner.compute(x, -y);
        if self.sign == 1 {
            k_plus + k_minus
        } else {
            k_plus - k_minus
        }
    }

    fn xrange(&self) -> (f64, f64) {
        (0.0, self.inner.xrange().1)
    }

    fn yrange(&self) -> (f64, f64) {
        (0.0, self.inner.yrange().1)
    }

    fn sve_hints(&self, epsilon: f64) -> Result<SVEHints, SVEError> {
        let inner = self.inner.sve_hints(epsilon)?;
        Ok(SVEHints {
            segments_x: positive_half(&inner.segments_x)?,
            segments_y: positive_half(&inner.segments_y)?,
            ngauss: inner.ngauss,
            nsvals: inner.nsvals.div_ceil(2),
        })
    }

    fn is_centrosymmetric(&self) -> bool {
        false
    }
}

fn ngauss_for(epsilon: f64) -> usize {
    if epsilon >= 1e-8 {
        10
    } else {
        16
    }
}

fn rounded_count(value: f64, min: usize) -> usize {
    if value.is_finite() && value > 0.0 {
        (value.round() as usize).max(min)
    } else {
        min
    }
}

/// Edges [-z_n, ..., -z_1, 0, z_1, ..., z_n] with z_n = 1 and spacing
/// proportional to 1/cosh(alpha i)
fn cosh_spaced_segments(nzeros: usize, alpha: f64) -> Vec<f64> {
    let mut zeros: Vec<f64> = (0..nzeros)
        .scan(0.0, |acc, i| {
            *acc += 1.0 / (alpha * i as f64).cosh();
            Some(*acc)
        })
        .collect();
    let last = zeros[nzeros - 1];
    zeros.iter_mut().for_each(|z| *z /= last);

    let mut segments = Vec::with_capacity(2 * nzeros + 1);
    segments.extend(zeros.iter().rev().map(|&z| -z));
    segments.push(0.0);
    segments.extend_from_slice(&zeros);
    segments
}

/// Edges [-1, z_1, ..., z_{n-1}, 0, -z_{n-1}, ..., -z_1, 1] where the z_i - (-1)
/// are the normalized partial sums of `diffs`
fn mirrored_segments(diffs: &[f64]) -> Vec<f64> {
    let cumsum: Vec<f64> = diffs
        .iter()
        .scan(0.0, |acc, &d| {
            *acc += d;
            Some(*acc)
        })
        .collect();
    let total = cumsum[cumsum.len() - 1];
    let zeros: Vec<f64> = cumsum[..cumsum.len() - 1]
        .iter()
        .map(|&c| c / total - 1.0)
        .collect();

    let mut segments = Vec::with_capacity(2 * zeros.len() + 3);
    segments.push(-1.0);
    segments.extend_from_slice(&zeros);
    segments.push(0.0);
    segments.extend(zeros.iter().rev().map(|&z| -z));
    segments.push(1.0);
    segments
}

/// Non-negative half of a symmetric edge list, starting at 0
fn positive_half(segments: &[f64]) -> Result<Vec<f64>, SVEError> {
    let n = segments.len();
    if n < 2 {
        return Err(SVEError::InvalidSegments(format!(
            "need at least 2 edges, got {n}"
        )));
    }
    let tol = 1e-12 * (segments[n - 1] - segments[0]).abs();
    if (0..n).any(|i| (segments[i] + segments[n - 1 - i]).abs() > tol) {
        return Err(SVEError::InvalidSegments(
            "segments must be symmetric about 0".to_string(),
        ));
    }

    let mut half = segments[n / 2..].to_vec();
    if half[0].abs() <= tol {
        half[0] = 0.0;
    } else {
        half.insert(0, 0.0);
    }
    Ok(half)
}

#[cfg(test)]
#[path = "kernel_tests.rs"]
mod tests;
