//! Gauss quadrature rules for numerical integration
//!
//! The integral of f(x) over [a, b] is approximated by a weighted sum:
//!
//! sum(f(xi) * wi for (xi, wi) in zip(x, w))
//!
//! which converges superexponentially for smooth f(x) with the number of
//! quadrature points. Piecewise rules over a segment grid are the
//! collocation grids of the SVE discretization.

use crate::error::SVEError;
use crate::numeric::CustomNumeric;
use ndarray::Array2;
use xprec_svd::Precision;

/// Quadrature rule for numerical integration.
///
/// Represents an approximation of an integral by a weighted sum over discrete points.
/// Besides the points `x` and weights `w`, the rule keeps the distances to
/// both endpoints, which are more accurate than `x - a` recomputed after a
/// reseat.
#[derive(Debug, Clone)]
pub struct Rule<T> {
    /// Quadrature points, strictly increasing
    pub x: Vec<T>,
    /// Quadrature weights
    pub w: Vec<T>,
    /// Distance from left endpoint: x - a
    pub x_forward: Vec<T>,
    /// Distance from right endpoint: b - x
    pub x_backward: Vec<T>,
    /// Left endpoint of integration interval
    pub a: T,
    /// Right endpoint of integration interval
    pub b: T,
}

impl<T: CustomNumeric> Rule<T> {
    /// Create a new quadrature rule from points and weights.
    ///
    /// # Panics
    /// Panics if x and w have different lengths.
    pub fn new(x: Vec<T>, w: Vec<T>, a: T, b: T) -> Self {
        assert_eq!(x.len(), w.len(), "x and w must have the same length");

        let x_forward: Vec<T> = x.iter().map(|&xi| xi - a).collect();
        let x_backward: Vec<T> = x.iter().map(|&xi| b - xi).collect();

        Self {
            x,
            w,
            x_forward,
            x_backward,
            a,
            b,
        }
    }

    /// Create a rule without points on [-1, 1].
    pub fn empty() -> Self {
        Self::new(vec![], vec![], T::from_f64(-1.0), T::one())
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Reseat the rule to a new interval [a, b].
    ///
    /// Scales and translates the quadrature points and weights to the new interval.
    pub fn reseat(&self, a: T, b: T) -> Self {
        let half = T::from_f64(0.5);
        let scaling = (b - a) / (self.b - self.a);
        let midpoint_old = (self.b + self.a) * half;
        let midpoint_new = (b + a) * half;

        Self {
            x: self
                .x
                .iter()
                .map(|&xi| scaling * (xi - midpoint_old) + midpoint_new)
                .collect(),
            w: self.w.iter().map(|&wi| wi * scaling).collect(),
            x_forward: self.x_forward.iter().map(|&xi| xi * scaling).collect(),
            x_backward: self.x_backward.iter().map(|&xi| xi * scaling).collect(),
            a,
            b,
        }
    }

    /// Scale the weights by a factor.
    pub fn scale(&self, factor: T) -> Self {
        Self {
            x: self.x.clone(),
            w: self.w.iter().map(|&wi| wi * factor).collect(),
            x_forward: self.x_forward.clone(),
            x_backward: self.x_backward.clone(),
            a: self.a,
            b: self.b,
        }
    }

    /// Create a piecewise rule over multiple segments.
    ///
    /// The rule is reseated onto every segment `[edges[i], edges[i+1]]` and
    /// the copies are concatenated segment by segment, so point `k` of
    /// segment `i` ends up at index `i * self.len() + k`.
    ///
    /// # Errors
    /// [`SVEError::InvalidSegments`] if there are fewer than two edges or the
    /// edges are not strictly increasing.
    pub fn piecewise(&self, edges: &[T]) -> Result<Self, SVEError> {
        if edges.len() < 2 {
            return Err(SVEError::InvalidSegments(format!(
                "need at least 2 edges, got {}",
                edges.len()
            )));
        }
        if let Some(i) = (1..edges.len()).find(|&i| edges[i] <= edges[i - 1]) {
            return Err(SVEError::InvalidSegments(format!(
                "edges must be strictly increasing (violated at index {i})"
            )));
        }

        let rules: Vec<Self> = edges
            .windows(2)
            .map(|pair| self.reseat(pair[0], pair[1]))
            .collect();
        Self::join(&rules)
    }

    /// Join contiguous rules into a single rule, keeping their order.
    ///
    /// # Errors
    /// [`SVEError::InvalidSegments`] if a rule does not start where the
    /// previous one ends.
    pub fn join(rules: &[Self]) -> Result<Self, SVEError> {
        let (first, last) = match (rules.first(), rules.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Ok(Self::empty()),
        };
        let a = first.a;
        let b = last.b;

        for i in 1..rules.len() {
            let gap = Precision::abs(rules[i].a - rules[i - 1].b);
            if gap > T::epsilon() * Precision::abs(b - a) {
                return Err(SVEError::InvalidSegments(format!(
                    "rules must be contiguous (gap at rule {i})"
                )));
            }
        }

        let total: usize = rules.iter().map(|r| r.len()).sum();
        let mut x = Vec::with_capacity(total);
        let mut w = Vec::with_capacity(total);
        let mut x_forward = Vec::with_capacity(total);
        let mut x_backward = Vec::with_capacity(total);

        for rule in rules {
            x.extend_from_slice(&rule.x);
            w.extend_from_slice(&rule.w);
            // Shift endpoint distances to global coordinates
            x_forward.extend(rule.x_forward.iter().map(|&xi| xi + (rule.a - a)));
            x_backward.extend(rule.x_backward.iter().map(|&xi| xi + (b - rule.b)));
        }

        Ok(Self {
            x,
            w,
            x_forward,
            x_backward,
            a,
            b,
        })
    }

    /// Validate the rule for consistency.
    ///
    /// # Returns
    /// `true` if the rule is valid, `false` otherwise.
    pub fn validate(&self) -> bool {
        if self.a >= self.b {
            return false;
        }
        let n = self.x.len();
        if self.w.len() != n || self.x_forward.len() != n || self.x_backward.len() != n {
            return false;
        }
        if self.x.iter().any(|&xi| xi < self.a || xi > self.b) {
            return false;
        }
        if (1..n).any(|i| self.x[i] <= self.x[i - 1]) {
            return false;
        }

        let tol = T::from_f64(16.0) * T::epsilon() * (self.b - self.a);
        (0..n).all(|i| {
            Precision::abs(self.x_forward[i] - (self.x[i] - self.a)) <= tol
                && Precision::abs(self.x_backward[i] - (self.b - self.x[i])) <= tol
        })
    }
}

/// Legendre polynomial P_n(x) and its derivative by the three-term recurrence.
fn legendre_polynomial_and_derivative<T: CustomNumeric>(n: usize, x: T) -> (T, T) {
    if n == 0 {
        return (T::one(), T::zero());
    }

    let one = T::one();
    let two = T::from_f64(2.0);
    let mut p0 = one;
    let mut p1 = x;
    let mut dp0 = T::zero();
    let mut dp1 = one;

    for k in 2..=n {
        let k_f = T::from_usize(k);
        let k1_f = T::from_usize(k - 1);

        let p2 = ((two * k1_f + one) * x * p1 - k1_f * p0) / k_f;
        let dp2 = ((two * k1_f + one) * (p1 + x * dp1) - k1_f * dp0) / k_f;

        p0 = p1;
        p1 = p2;
        dp0 = dp1;
        dp1 = dp2;
    }

    (p1, dp1)
}

/// Gauss-Legendre nodes and weights on [-1, 1], nodes ascending.
///
/// Starting values come from the asymptotic formula in `f64`; Newton's method
/// then runs in `T`, so the nodes are accurate to the working precision.
fn gauss_legendre_nodes_weights<T: CustomNumeric>(n: usize) -> (Vec<T>, Vec<T>) {
    let mut x = vec![T::zero(); n];
    let mut w = vec![T::zero(); n];
    let one = T::one();
    let two = T::from_f64(2.0);

    for i in 0..n.div_ceil(2) {
        let guess = (std::f64::consts::PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
        let mut z = T::from_f64(guess);

        for _ in 0..100 {
            let (p, dp) = legendre_polynomial_and_derivative(n, z);
            let dz = p / dp;
            z = z - dz;
            if Precision::abs(dz) <= T::epsilon() {
                break;
            }
        }
        if n % 2 == 1 && i == n / 2 {
            z = T::zero();
        }

        let (_, dp) = legendre_polynomial_and_derivative(n, z);
        let weight = two / ((one - z * z) * dp * dp);

        x[i] = -z;
        w[i] = weight;
        x[n - 1 - i] = z;
        w[n - 1 - i] = weight;
    }

    (x, w)
}

/// Create a Gauss-Legendre quadrature rule with n points on [-1, 1].
pub fn legendre<T: CustomNumeric>(n: usize) -> Rule<T> {
    if n == 0 {
        return Rule::empty();
    }
    let (x, w) = gauss_legendre_nodes_weights(n);
    Rule::new(x, w, T::from_f64(-1.0), T::one())
}

/// Create Legendre Vandermonde matrix for polynomial interpolation
///
/// # Returns
/// Matrix V where V[i,j] = P_j(x_i), with P_j being the j-th Legendre polynomial
pub fn legendre_vandermonde<T: CustomNumeric>(x: &[T], degree: usize) -> Array2<T> {
    let n = x.len();
    let mut v = Array2::from_elem((n, degree + 1), T::zero());

    for i in 0..n {
        v[[i, 0]] = T::one();
        if degree > 0 {
            v[[i, 1]] = x[i];
        }
    }

    // P_j(x) = ((2j-1) x P_{j-1}(x) - (j-1) P_{j-2}(x)) / j
    for j in 2..=degree {
        let a = T::from_usize(2 * j - 1);
        let b = T::from_usize(j - 1);
        let c = T::from_usize(j);
        for i in 0..n {
            v[[i, j]] = (a * x[i] * v[[i, j - 1]] - b * v[[i, j - 2]]) / c;
        }
    }

    v
}

/// Matrix mapping values at the nodes of a Gauss rule to Legendre coefficients
///
/// For a rule with n points on [-1, 1], returns the n × n matrix
/// C[l, k] = (l + 1/2) w_k P_l(x_k), so that `C · f(x)` are the coefficients
/// of the degree n-1 interpolant of f. C is the inverse of
/// `legendre_vandermonde(x, n-1)`.
pub fn legendre_collocation<T: CustomNumeric>(rule: &Rule<T>) -> Array2<T> {
    let n = rule.len();
    if n == 0 {
        return Array2::from_elem((0, 0), T::zero());
    }
    let v = legendre_vandermonde(&rule.x, n - 1);
    let half = T::from_f64(0.5);
    Array2::from_shape_fn((n, n), |(l, k)| v[[k, l]] * rule.w[k] * (T::from_usize(l) + half))
}

#[cfg(test)]
#[path = "gauss_tests.rs"]
mod tests;
